//! # seminar-report
//!
//! Turn a seminar feedback survey export (CSV) into a five-page PDF summary.
//!
//! ## Why this crate?
//!
//! Feedback forms are exported as one row per attendee, with Likert answers
//! such as `"4: Agree"` in `Question [Aspect]` columns and free-text answers
//! next to them. Organisers want a single document: how each response
//! scored, one overall number, and everything people wrote. This crate
//! produces exactly that, deterministically, from the raw export.
//!
//! ## Pipeline Overview
//!
//! ```text
//! CSV
//!  │
//!  ├─ 1. Input    local file or uploaded bytes
//!  ├─ 2. Table    parse with spreadsheet-style missing values
//!  ├─ 3. Extract  six bracket-tagged rating columns → scores + grand mean
//!  ├─ 4. Render   heatmap, mean score, three free-text digests
//!  └─ 5. Output   PDF bytes + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seminar_report::{convert_to_file, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::default();
//!     let stats = convert_to_file("responses.csv", "summary.pdf", &config).await?;
//!     eprintln!("{} responses, mean {}", stats.responses, stats.mean_display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `seminar-report` and `seminar-handler` binaries (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! seminar-report = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod handler;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ReportConfig, ReportConfigBuilder};
pub use convert::{convert_from_bytes, convert_sync, convert_to_file, generate_report, run};
pub use error::ReportError;
pub use handler::{handle_event, HandlerResponse, UploadEvent};
pub use output::{ReportOutput, ReportStats};
pub use pipeline::extract::{Category, FeedbackMatrix, MeanScore};
pub use pipeline::input::{CsvSource, FileSink, InMemoryCsv, LocalCsv, ReportSink};
pub use pipeline::table::SurveyTable;
