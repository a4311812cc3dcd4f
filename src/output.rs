//! Result types returned by the report entry points.

use crate::pipeline::extract::MeanScore;
use serde::{Deserialize, Serialize};

/// A rendered report.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    /// The complete PDF document.
    pub pdf: Vec<u8>,

    /// What went into it.
    pub stats: ReportStats,
}

/// Summary statistics for one generated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Data rows in the survey (one per response).
    pub responses: usize,

    /// Rating cells that held a usable score.
    pub scored_cells: usize,

    /// Rating cells left missing after coercion.
    pub missing_cells: usize,

    /// Grand mean score; `None` when nothing was scored.
    pub mean_score: Option<f64>,

    /// Pages in the PDF (always five).
    pub page_count: usize,

    /// Size of the PDF in bytes.
    pub pdf_bytes: usize,

    /// Wall-clock time spent parsing and rendering.
    pub duration_ms: u64,
}

impl ReportStats {
    /// The mean as it appears on page 2.
    pub fn mean_display(&self) -> String {
        MeanScore(self.mean_score).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialise_missing_mean_as_null() {
        let stats = ReportStats {
            responses: 1,
            scored_cells: 0,
            missing_cells: 6,
            mean_score: None,
            page_count: 5,
            pdf_bytes: 1024,
            duration_ms: 3,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["mean_score"].is_null());
        assert_eq!(json["page_count"], 5);
        assert_eq!(stats.mean_display(), "nan");
    }
}
