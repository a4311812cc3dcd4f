//! Error types for the seminar-report library.
//!
//! Everything that stops a report from being produced is a [`ReportError`].
//! Cell-level problems (an empty rating, a free-text answer in a Likert
//! column) are not errors at all: they become missing values inside the
//! [`crate::pipeline::extract::FeedbackMatrix`] and are skipped by the mean.
//!
//! The variants are grouped by the stage that raises them so that the
//! upload handler can tell a bad upload (4xx) from an internal fault (5xx)
//! with [`ReportError::is_input_error`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the seminar-report library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("CSV file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Upload errors ─────────────────────────────────────────────────────
    /// The event body was delivered as plain text.
    #[error("Request body must be base64 encoded.")]
    NotBase64Encoded,

    /// The event body is not valid base64.
    #[error("Invalid base64 body: {0}")]
    InvalidBase64(String),

    /// No `content-type` header was sent with the upload.
    #[error("Missing content-type header")]
    MissingContentType,

    /// Boundary missing or the multipart stream is malformed.
    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    /// The multipart body has no field named `file`.
    #[error("No 'file' field in the uploaded form")]
    MissingFileField,

    /// Decoded upload exceeds the configured limit.
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    UploadTooLarge { size: usize, limit: usize },

    // ── CSV errors ────────────────────────────────────────────────────────
    /// The CSV has no header row.
    #[error("No columns to parse from file")]
    EmptyCsv,

    /// The CSV could not be tokenized.
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    // ── Shape errors ──────────────────────────────────────────────────────
    /// Fewer columns than the free-text pages need.
    #[error("Survey has {found} columns but at least {required} are required")]
    TooFewColumns { found: usize, required: usize },

    /// The number of bracket-tagged rating columns is not six.
    #[error(
        "Expected 6 bracket-tagged rating columns, found {found}: {}",
        headers.join(", ")
    )]
    UnexpectedColumnShape { found: usize, headers: Vec<String> },

    // ── Render errors ─────────────────────────────────────────────────────
    /// lopdf refused to encode or serialise a page.
    #[error("PDF rendering failed: {0}")]
    RenderFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// `true` when the caller sent something we cannot turn into a report.
    ///
    /// Rendering, output and internal failures are ours, not the caller's.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ReportError::FileNotFound { .. }
                | ReportError::PermissionDenied { .. }
                | ReportError::InputReadFailed { .. }
                | ReportError::NotBase64Encoded
                | ReportError::InvalidBase64(_)
                | ReportError::MissingContentType
                | ReportError::InvalidMultipart(_)
                | ReportError::MissingFileField
                | ReportError::UploadTooLarge { .. }
                | ReportError::EmptyCsv
                | ReportError::CsvParse(_)
                | ReportError::TooFewColumns { .. }
                | ReportError::UnexpectedColumnShape { .. }
        )
    }

    /// HTTP status the upload handler answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::UploadTooLarge { .. } => 413,
            e if e.is_input_error() => 400,
            _ => 500,
        }
    }
}

impl From<lopdf::Error> for ReportError {
    fn from(e: lopdf::Error) -> Self {
        ReportError::RenderFailed(e.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::CsvParse(e.to_string())
    }
}
