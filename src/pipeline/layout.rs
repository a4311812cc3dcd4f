//! Text layout for the standard Helvetica font.
//!
//! The report uses the built-in Type1 Helvetica so no font file has to be
//! embedded. That font only covers WinAnsi (CP-1252), so strings are encoded
//! to single bytes here, and widths come from the Helvetica AFM metrics so
//! that right-aligned labels and word wrapping line up.

use tracing::warn;

/// Advance widths (1/1000 em) for WinAnsi bytes 0x20..=0x7E.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// WinAnsi code for the bullet character.
pub const BULLET: u8 = 0x95;

/// Width of one WinAnsi byte in 1/1000 em.
fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        BULLET => 350,
        0x85 | 0x89 => 1000,
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x96 => 556,
        0x97 => 1000,
        0xA0 => 278,
        _ => 556,
    }
}

/// Map one char to WinAnsi; `None` when the font cannot show it.
fn win_ansi(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‰' => 0x89,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => BULLET,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' => b' ',
        _ => return None,
    };
    Some(byte)
}

/// Encode a single line of text for a Helvetica `Tj` operand.
///
/// Unsupported characters are replaced with `?`.
pub fn encode(text: &str) -> Vec<u8> {
    let mut dropped = 0usize;
    let bytes = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .map(|c| {
            win_ansi(c).unwrap_or_else(|| {
                dropped += 1;
                b'?'
            })
        })
        .collect();
    if dropped > 0 {
        warn!("{} character(s) outside WinAnsi replaced with '?'", dropped);
    }
    bytes
}

/// Rendered width in points of already-encoded text.
pub fn encoded_width(bytes: &[u8], font_size: f32) -> f32 {
    let units: u32 = bytes.iter().map(|&b| u32::from(glyph_width(b))).sum();
    units as f32 * font_size / 1000.0
}

/// Rendered width in points of `text` at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| u32::from(glyph_width(win_ansi(c).unwrap_or(b'?'))))
        .sum();
    units as f32 * font_size / 1000.0
}

/// Greedy word wrap to `max_width` points.
///
/// Explicit newlines are kept (blank lines included). Words wider than a
/// whole line are broken between characters.
pub fn wrap(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font_size) <= max_width {
                current = word.to_string();
            } else {
                for c in word.chars() {
                    current.push(c);
                    if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(c);
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}
