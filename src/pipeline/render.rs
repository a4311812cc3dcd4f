//! Report rendering: five page canvases → one PDF document.
//!
//! ## Why build the PDF by hand?
//!
//! The report is five pages of rectangles and text in the standard Helvetica
//! font. lopdf writes exactly the objects we add, in object-id order, with no
//! creation date or random document ID, so the same survey always produces
//! the same bytes. That makes reports diffable and lets tests compare output
//! directly.
//!
//! ## Page order
//!
//! | # | Page |
//! |---|------|
//! | 1 | heatmap (10 × 8 in) |
//! | 2 | mean overall score (8.5 × 11 in) |
//! | 3 | Key Takeaways |
//! | 4 | Speaker Strengths |
//! | 5 | Suggestions for Improvement |

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::pipeline::canvas::{Align, Canvas, Rgb};
use crate::pipeline::extract::{FeedbackMatrix, MeanScore};
use crate::pipeline::table::SurveyTable;
use crate::pipeline::{heatmap, layout};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::{debug, warn};

/// US Letter, 8.5 × 11 inches.
pub const LETTER: (f32, f32) = (612.0, 792.0);

/// Number of pages in every report.
pub const PAGE_COUNT: usize = 5;

/// Headings of the three digest pages, in page order.
pub const DIGEST_HEADINGS: [&str; 3] = [
    "Key Takeaways:",
    "Speaker Strengths:",
    "Suggestions for Improvement:",
];

/// Separator placed before every digest answer.
pub const BULLET_SEPARATOR: &str = "\n\n• ";

/// Text anchor of the digest pages as a fraction of the page size.
const DIGEST_ANCHOR: (f32, f32) = (0.05, 0.95);

/// Line pitch as a multiple of the font size.
const LINE_SPACING: f32 = 1.2;

/// Lines whose baseline would fall below this are not drawn.
const BOTTOM_MARGIN: f32 = 36.0;

/// Render the complete report.
pub fn render_report(
    table: &SurveyTable,
    matrix: &FeedbackMatrix,
    mean: MeanScore,
    config: &ReportConfig,
) -> Result<Vec<u8>, ReportError> {
    let mut pages = Vec::with_capacity(PAGE_COUNT);
    pages.push(heatmap::draw(matrix));
    pages.push(score_page(mean, config.score_font_size));

    for (heading, &column) in DIGEST_HEADINGS.iter().zip(config.text_columns.iter()) {
        let answers: Vec<&str> = table
            .column(column)
            .ok_or(ReportError::TooFewColumns {
                found: table.column_count(),
                required: config.required_columns(),
            })?
            .present_text()
            .collect();
        debug!("{} {} answer(s) from column {}", heading, answers.len(), column);
        pages.push(digest_page(heading, &answers, config.text_font_size));
    }

    assemble(pages, config)
}

/// Page 2: the mean score, centred.
pub fn score_page(mean: MeanScore, font_size: f32) -> Canvas {
    let (w, h) = LETTER;
    let mut canvas = Canvas::new(w, h);
    canvas.fill_color(Rgb::BLACK);
    canvas.text(
        w / 2.0,
        h / 2.0 - font_size * 0.35,
        font_size,
        Align::Center,
        &format!("Mean Overall Score: {mean}"),
    );
    canvas
}

/// Heading followed by one bullet per answer; just the heading when there
/// are no answers.
pub fn digest_text(heading: &str, answers: &[&str]) -> String {
    let mut text = heading.to_string();
    for answer in answers {
        text.push_str(BULLET_SEPARATOR);
        text.push_str(answer);
    }
    text
}

/// Pages 3–5: a wrapped text digest anchored at the top-left.
pub fn digest_page(heading: &str, answers: &[&str], font_size: f32) -> Canvas {
    let (w, h) = LETTER;
    let mut canvas = Canvas::new(w, h);
    canvas.fill_color(Rgb::BLACK);

    let x = w * DIGEST_ANCHOR.0;
    let top = h * DIGEST_ANCHOR.1;
    let lines = layout::wrap(&digest_text(heading, answers), font_size, w - 2.0 * x);
    let pitch = font_size * LINE_SPACING;

    // First baseline sits one ascent below the anchor.
    let mut y = top - font_size * 0.8;
    for (i, line) in lines.iter().enumerate() {
        if y < BOTTOM_MARGIN {
            warn!(
                "'{}' page full: {} of {} line(s) not shown",
                heading.trim_end_matches(':'),
                lines.len() - i,
                lines.len()
            );
            break;
        }
        if !line.is_empty() {
            canvas.text(x, y, font_size, Align::Left, line);
        }
        y -= pitch;
    }
    canvas
}

/// Serialise page canvases into a single PDF.
fn assemble(pages: Vec<Canvas>, config: &ReportConfig) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for canvas in pages {
        let (w, h) = (canvas.width(), canvas.height());
        let content = canvas.into_content().encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(layout::encode(&config.document_title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("seminar-report ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    if config.compress {
        doc.compress();
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ReportError::RenderFailed(format!("serialise: {e}")))?;
    debug!("Serialised {} page(s) → {} bytes", count, buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(canvas: Canvas) -> Vec<String> {
        canvas
            .into_content()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    #[test]
    fn digest_text_joins_with_bullets() {
        assert_eq!(
            digest_text("Key Takeaways:", &["one", "two"]),
            "Key Takeaways:\n\n• one\n\n• two"
        );
    }

    #[test]
    fn empty_digest_is_heading_only() {
        assert_eq!(digest_text("Speaker Strengths:", &[]), "Speaker Strengths:");
        let ops = operators(digest_page("Speaker Strengths:", &[], 12.0));
        assert_eq!(ops.iter().filter(|o| *o == "Tj").count(), 1);
    }

    #[test]
    fn digest_draws_one_run_per_non_blank_line() {
        // heading, blank, bullet, blank, bullet
        let ops = operators(digest_page("H:", &["a", "b"], 12.0));
        assert_eq!(ops.iter().filter(|o| *o == "Tj").count(), 3);
    }

    #[test]
    fn overflowing_digest_stops_at_bottom_margin() {
        let answers: Vec<String> = (0..500).map(|i| format!("answer {i}")).collect();
        let refs: Vec<&str> = answers.iter().map(String::as_str).collect();
        let ops = operators(digest_page("H:", &refs, 12.0));
        let drawn = ops.iter().filter(|o| *o == "Tj").count();
        assert!(drawn > 10 && drawn < 500, "drawn {drawn}");
    }

    #[test]
    fn score_page_is_a_single_line() {
        let ops = operators(score_page(MeanScore(Some(3.0)), 32.0));
        assert_eq!(ops.iter().filter(|o| *o == "Tj").count(), 1);
    }

    #[test]
    fn report_has_five_pages() {
        let csv = "a,b,Q [1],Q [2],Q [3],Q [4],t,s,i,Q [5],Q [6]\n\
                   x,y,1,2,3,4,good,clear,slower,5,4\n";
        let table = SurveyTable::parse(csv.as_bytes()).unwrap();
        let config = ReportConfig::default();
        let matrix = FeedbackMatrix::extract(&table, &config).unwrap();
        let pdf = render_report(&table, &matrix, matrix.mean_score(), &config).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), PAGE_COUNT);
    }
}
