//! Pipeline stages for survey-to-report generation.
//!
//! Each submodule implements one step and is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ table ──▶ extract ──▶ heatmap ──▶ render ──▶ input
//! (bytes)   (CSV)     (scores)    (page 1)    (PDF)      (sink)
//! ```
//!
//! 1. [`input`]   — [`input::CsvSource`] / [`input::ReportSink`] for files
//!    and in-memory buffers
//! 2. [`table`]   — parse CSV into typed columns with spreadsheet-style
//!    missing-value tokens
//! 3. [`extract`] — pick the six bracket-tagged rating columns and coerce
//!    `"4: Agree"` style answers to numbers
//! 4. [`heatmap`] — draw the coolwarm response × category grid
//! 5. [`render`]  — lay out the score and digest pages and serialise the PDF
//!
//! [`canvas`] and [`layout`] are the drawing primitives the page builders
//! share.

pub mod canvas;
pub mod extract;
pub mod heatmap;
pub mod input;
pub mod layout;
pub mod render;
pub mod table;
