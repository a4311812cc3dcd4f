//! Rating extraction: bracket-tagged columns → numeric feedback matrix.
//!
//! Survey tools export Likert questions as `Question [Aspect]` columns with
//! answers like `"4: Strongly Agree"`. Extraction keeps the part before the
//! first `:`, parses it as a float and leaves anything unparseable as a
//! missing value. A single odd answer never fails the report.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::pipeline::table::{parse_number, Cell, SurveyTable};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The six rated aspects, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Importance,
    Methods,
    Results,
    FutureDiscussion,
    QualityOfResearch,
    QualityOfPresentation,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Importance,
        Category::Methods,
        Category::Results,
        Category::FutureDiscussion,
        Category::QualityOfResearch,
        Category::QualityOfPresentation,
    ];

    /// Label used on the heatmap axis.
    pub fn label(self) -> &'static str {
        match self {
            Category::Importance => "Importance",
            Category::Methods => "Methods",
            Category::Results => "Results",
            Category::FutureDiscussion => "Future_Discussion",
            Category::QualityOfResearch => "Quality_of_Research",
            Category::QualityOfPresentation => "Quality_of_Presentation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `true` for headers that tag a rating question, e.g. `"Rate [Methods]"`.
pub fn is_rating_header(header: &str) -> bool {
    header.contains('[') && header.contains(']')
}

/// Indices of the bracket-tagged columns, left to right.
pub fn rating_columns(table: &SurveyTable) -> Vec<usize> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|(_, h)| is_rating_header(h))
        .map(|(i, _)| i)
        .collect()
}

/// Reduce a cell to its score.
///
/// Text keeps only what precedes the first `:`; numbers pass through.
pub fn coerce_cell(cell: Cell<'_>) -> Option<f64> {
    match cell {
        Cell::Missing => None,
        Cell::Number(v) => Some(v),
        Cell::Text(raw) => {
            let head = raw.split(':').next().unwrap_or(raw);
            parse_number(head)
        }
    }
}

/// Per-response scores for the six categories.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackMatrix {
    rows: Vec<[Option<f64>; 6]>,
}

impl FeedbackMatrix {
    /// Check the survey's shape and extract the rating matrix.
    ///
    /// # Errors
    /// - [`ReportError::TooFewColumns`] when the free-text columns configured
    ///   in `config` do not exist
    /// - [`ReportError::UnexpectedColumnShape`] unless exactly six headers
    ///   are bracket-tagged
    pub fn extract(table: &SurveyTable, config: &ReportConfig) -> Result<Self, ReportError> {
        let required = config.required_columns();
        if table.column_count() < required {
            return Err(ReportError::TooFewColumns {
                found: table.column_count(),
                required,
            });
        }

        let selected = rating_columns(table);
        if selected.len() != Category::ALL.len() {
            return Err(ReportError::UnexpectedColumnShape {
                found: selected.len(),
                headers: selected
                    .iter()
                    .map(|&i| table.headers()[i].clone())
                    .collect(),
            });
        }

        let mut rows = vec![[None; 6]; table.row_count()];
        for (slot, &col_idx) in selected.iter().enumerate() {
            let column = table
                .column(col_idx)
                .ok_or_else(|| ReportError::Internal(format!("column {col_idx} vanished")))?;
            debug!(
                "{} ← '{}' ({:?})",
                Category::ALL[slot],
                column.header(),
                column.kind()
            );
            for (row, cell) in rows.iter_mut().zip(column.cells()) {
                row[slot] = coerce_cell(cell);
            }
        }

        Ok(Self { rows })
    }

    /// Build a matrix directly from rows (tests and callers with parsed data).
    pub fn from_rows(rows: Vec<[Option<f64>; 6]>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[[Option<f64>; 6]] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of cells holding a score.
    pub fn scored_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Number of cells left missing after coercion.
    pub fn missing_cells(&self) -> usize {
        self.rows.len() * Category::ALL.len() - self.scored_cells()
    }

    /// Smallest and largest score, or `None` when nothing was scored.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Mean of per-response means; all-missing responses are skipped.
    pub fn mean_score(&self) -> MeanScore {
        let row_means: Vec<f64> = self.rows.iter().filter_map(|row| mean(row.iter().flatten())).collect();
        MeanScore(mean(row_means.iter()))
    }
}

fn mean<'a>(values: impl Iterator<Item = &'a f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Grand mean satisfaction score; `None` when no cell was scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanScore(pub Option<f64>);

impl MeanScore {
    pub fn value(self) -> Option<f64> {
        self.0
    }
}

impl fmt::Display for MeanScore {
    /// Two decimals; `nan` when undefined.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v:.2}"),
            None => f.write_str("nan"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Timestamp,Name,Rate [Importance],Rate [Methods],Rate [Results],\
Rate [Future],Takeaways,Strengths,Suggestions,Rate [Research],Rate [Presentation]";

    fn table(rows: &[&str]) -> SurveyTable {
        let mut csv = String::from(HEADER);
        for r in rows {
            csv.push('\n');
            csv.push_str(r);
        }
        SurveyTable::parse(csv.as_bytes()).unwrap()
    }

    #[test]
    fn label_prefix_is_stripped() {
        assert_eq!(coerce_cell(Cell::Text("4: Strongly Agree")), Some(4.0));
        assert_eq!(coerce_cell(Cell::Text("2.5:ok:still")), Some(2.5));
        assert_eq!(coerce_cell(Cell::Number(3.0)), Some(3.0));
    }

    #[test]
    fn unparseable_cells_are_missing() {
        assert_eq!(coerce_cell(Cell::Text("Strongly Agree")), None);
        assert_eq!(coerce_cell(Cell::Text(": 4")), None);
        assert_eq!(coerce_cell(Cell::Missing), None);
    }

    #[test]
    fn rating_headers_need_both_brackets() {
        assert!(is_rating_header("Rate [Methods]"));
        assert!(is_rating_header("odd ] then ["));
        assert!(!is_rating_header("Rate [Methods"));
        assert!(!is_rating_header("Plain"));
    }

    #[test]
    fn extracts_in_canonical_order() {
        let t = table(&["t,n,4: A,3: B,5,2,x,y,z,1: C,4"]);
        let m = FeedbackMatrix::extract(&t, &ReportConfig::default()).unwrap();
        assert_eq!(
            m.rows()[0],
            [Some(4.0), Some(3.0), Some(5.0), Some(2.0), Some(1.0), Some(4.0)]
        );
    }

    #[test]
    fn mean_of_row_means() {
        let m = FeedbackMatrix::from_rows(vec![[Some(4.0); 6], [Some(2.0); 6]]);
        assert_eq!(m.mean_score().to_string(), "3.00");
    }

    #[test]
    fn row_mean_skips_missing_cells() {
        // Row means: 4.0 (from two cells) and 1.0 → 2.5
        let m = FeedbackMatrix::from_rows(vec![
            [Some(5.0), Some(3.0), None, None, None, None],
            [Some(1.0); 6],
        ]);
        assert_eq!(m.mean_score().value(), Some(2.5));
    }

    #[test]
    fn all_missing_row_is_excluded() {
        let m = FeedbackMatrix::from_rows(vec![[None; 6], [Some(3.0); 6]]);
        assert_eq!(m.mean_score().value(), Some(3.0));
        assert_eq!(m.missing_cells(), 6);
        assert_eq!(m.scored_cells(), 6);
    }

    #[test]
    fn nothing_scored_is_nan() {
        let m = FeedbackMatrix::from_rows(vec![[None; 6]]);
        assert_eq!(m.mean_score().value(), None);
        assert_eq!(m.mean_score().to_string(), "nan");
        assert_eq!(m.range(), None);
    }

    #[test]
    fn range_spans_scores() {
        let m = FeedbackMatrix::from_rows(vec![
            [Some(2.0), None, Some(5.0), None, None, None],
            [Some(1.5); 6],
        ]);
        assert_eq!(m.range(), Some((1.5, 5.0)));
    }

    #[test]
    fn five_rating_columns_is_a_shape_error() {
        let csv = "a,b,Q [1],Q [2],Q [3],Q [4],t,s,i,Q [5]\nx,x,1,1,1,1,a,b,c,1";
        let t = SurveyTable::parse(csv.as_bytes()).unwrap();
        let err = FeedbackMatrix::extract(&t, &ReportConfig::default()).unwrap_err();
        match err {
            ReportError::UnexpectedColumnShape { found, headers } => {
                assert_eq!(found, 5);
                assert_eq!(headers[4], "Q [5]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn too_few_columns_is_reported_first() {
        let t = SurveyTable::parse(b"Q [1],Q [2],Q [3],Q [4],Q [5],Q [6],a,b\n1,1,1,1,1,1,x,y").unwrap();
        let err = FeedbackMatrix::extract(&t, &ReportConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ReportError::TooFewColumns {
                found: 8,
                required: 9
            }
        ));
    }
}
