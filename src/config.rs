//! Configuration types for survey-to-PDF report generation.
//!
//! All report behaviour is controlled through [`ReportConfig`], built via its
//! [`ReportConfigBuilder`]. The defaults reproduce the standard seminar
//! feedback form: free-text answers in columns 6, 7 and 8, a 32 pt score
//! line, 12 pt digest text and a `seminar_summary.pdf` attachment name.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};

/// Default upload ceiling: 6 MiB, the request payload limit of common
/// serverless platforms.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 6 * 1024 * 1024;

/// Configuration for one report.
///
/// # Example
/// ```rust
/// use seminar_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .text_font_size(11.0)
///     .compress(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.text_columns, [6, 7, 8]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Zero-based column positions of the "Key Takeaways", "Speaker
    /// Strengths" and "Suggestions for Improvement" answers. Default: `[6, 7, 8]`.
    ///
    /// The survey export carries no stable header text for these questions,
    /// so they are located by position.
    pub text_columns: [usize; 3],

    /// Font size of the "Mean Overall Score" line. Range: 8–72. Default: 32.
    pub score_font_size: f32,

    /// Font size of the digest pages. Range: 6–36. Default: 12.
    pub text_font_size: f32,

    /// Flate-compress page content streams. Default: true.
    pub compress: bool,

    /// Filename offered in the `Content-Disposition` header of the upload
    /// handler's response. Default: `seminar_summary.pdf`.
    pub attachment_filename: String,

    /// Largest decoded upload body the handler accepts. Default: 6 MiB.
    pub max_upload_bytes: usize,

    /// Written to the PDF `Info` dictionary. Default: `Seminar Feedback Summary`.
    pub document_title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            text_columns: [6, 7, 8],
            score_font_size: 32.0,
            text_font_size: 12.0,
            compress: true,
            attachment_filename: "seminar_summary.pdf".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            document_title: "Seminar Feedback Summary".to_string(),
        }
    }
}

impl ReportConfig {
    /// Create a new builder for `ReportConfig`.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Minimum number of columns a survey must have for these settings.
    pub fn required_columns(&self) -> usize {
        self.text_columns.iter().copied().max().unwrap_or(0) + 1
    }
}

/// Builder for [`ReportConfig`].
#[derive(Debug)]
pub struct ReportConfigBuilder {
    config: ReportConfig,
}

impl ReportConfigBuilder {
    pub fn text_columns(mut self, columns: [usize; 3]) -> Self {
        self.config.text_columns = columns;
        self
    }

    pub fn score_font_size(mut self, size: f32) -> Self {
        self.config.score_font_size = size.clamp(8.0, 72.0);
        self
    }

    pub fn text_font_size(mut self, size: f32) -> Self {
        self.config.text_font_size = size.clamp(6.0, 36.0);
        self
    }

    pub fn compress(mut self, v: bool) -> Self {
        self.config.compress = v;
        self
    }

    pub fn attachment_filename(mut self, name: impl Into<String>) -> Self {
        self.config.attachment_filename = name.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn document_title(mut self, title: impl Into<String>) -> Self {
        self.config.document_title = title.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReportConfig, ReportError> {
        let c = &self.config;
        let [a, b, d] = c.text_columns;
        if a == b || a == d || b == d {
            return Err(ReportError::InvalidConfig(format!(
                "Free-text columns must be distinct, got {:?}",
                c.text_columns
            )));
        }
        if c.attachment_filename.trim().is_empty() || c.attachment_filename.contains('"') {
            return Err(ReportError::InvalidConfig(format!(
                "Attachment filename must be non-empty and contain no quotes, got {:?}",
                c.attachment_filename
            )));
        }
        if c.max_upload_bytes == 0 {
            return Err(ReportError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
