//! Page canvas: a thin builder over lopdf content-stream operators.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Text is always drawn in the page font `/F1` (Helvetica, WinAnsi), which
//! [`crate::pipeline::render`] registers in the shared page resources.

use crate::pipeline::layout;
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Resource name of the page font.
pub const FONT_NAME: &[u8] = b"F1";

/// An sRGB colour with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
}

/// How a path is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Fill,
    Stroke,
    FillStroke,
}

/// Horizontal anchoring of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One page worth of drawing operations.
#[derive(Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    ops: Vec<Operation>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn fill_color(&mut self, c: Rgb) {
        self.push("rg", vec![c.0.into(), c.1.into(), c.2.into()]);
    }

    pub fn stroke_color(&mut self, c: Rgb) {
        self.push("RG", vec![c.0.into(), c.1.into(), c.2.into()]);
    }

    pub fn line_width(&mut self, w: f32) {
        self.push("w", vec![w.into()]);
    }

    /// Rectangle with its bottom-left corner at (`x`, `y`).
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        self.push("re", vec![x.into(), y.into(), w.into(), h.into()]);
        let op = match paint {
            Paint::Fill => "f",
            Paint::Stroke => "S",
            Paint::FillStroke => "B",
        };
        self.push(op, vec![]);
    }

    /// Horizontal text with its baseline at `y`.
    pub fn text(&mut self, x: f32, y: f32, size: f32, align: Align, text: &str) {
        self.text_rotated(x, y, size, 0.0, align, text);
    }

    /// Text rotated counter-clockwise by `degrees` about its anchor.
    ///
    /// Alignment is measured along the rotated baseline, so a right-aligned
    /// run ends exactly at (`x`, `y`).
    pub fn text_rotated(&mut self, x: f32, y: f32, size: f32, degrees: f32, align: Align, text: &str) {
        let bytes = layout::encode(text);
        let width = layout::encoded_width(&bytes, size);
        let shift = match align {
            Align::Left => 0.0,
            Align::Center => width / 2.0,
            Align::Right => width,
        };
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (ox, oy) = (x - shift * cos, y - shift * sin);

        self.push("BT", vec![]);
        self.push("Tf", vec![Object::Name(FONT_NAME.to_vec()), size.into()]);
        self.push(
            "Tm",
            vec![cos.into(), sin.into(), (-sin).into(), cos.into(), ox.into(), oy.into()],
        );
        self.push("Tj", vec![Object::String(bytes, StringFormat::Literal)]);
        self.push("ET", vec![]);
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    /// Number of operators drawn so far.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_content(self) -> Content {
        Content {
            operations: self.ops,
        }
    }
}
