//! Survey table: the CSV export parsed into columns.
//!
//! Survey tools write every answer as text, so typing happens per column
//! after parsing: a column whose present cells all parse as floats is
//! [`ColumnKind::Numeric`], anything else is [`ColumnKind::Text`]. Missing
//! answers are recognised with the same NA tokens pandas uses, which is what
//! survey exports are usually checked against.

use crate::error::ReportError;
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracing::debug;

/// Tokens that mark a missing answer.
static NA_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .into_iter()
    .collect()
});

/// `true` when `raw` is one of the NA tokens.
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(raw)
}

/// Parse a number the way a CSV reader types a numeric column.
///
/// Surrounding whitespace is ignored; NaN and infinities are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Inferred type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

/// One typed cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

/// Survey responses, stored column by column in file order.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    headers: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
    rows: usize,
}

impl SurveyTable {
    /// Parse CSV bytes with a header row.
    ///
    /// Short rows are padded with missing cells; a row with more fields than
    /// the header is a parse error. A leading UTF-8 BOM is ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, ReportError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Err(ReportError::EmptyCsv);
        }

        let width = headers.len();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
        let mut rows = 0usize;

        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > width {
                return Err(ReportError::CsvParse(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    idx + 2,
                    record.len()
                )));
            }
            for (col, cells) in columns.iter_mut().enumerate() {
                let cell = record
                    .get(col)
                    .filter(|raw| !is_na(raw))
                    .map(str::to_string);
                cells.push(cell);
            }
            rows += 1;
        }

        debug!("Parsed survey: {} columns × {} rows", width, rows);
        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    /// Header strings, left to right.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of responses.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Typed access to column `idx`, or `None` when out of range.
    pub fn column(&self, idx: usize) -> Option<Column<'_>> {
        let cells = self.columns.get(idx)?;
        let kind = if cells.iter().flatten().all(|raw| parse_number(raw).is_some()) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        };
        Some(Column {
            header: &self.headers[idx],
            cells,
            kind,
        })
    }
}

/// Borrowed view of one column.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    header: &'a str,
    cells: &'a [Option<String>],
    kind: ColumnKind,
}

impl<'a> Column<'a> {
    pub fn header(&self) -> &'a str {
        self.header
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Cells typed by the column's kind.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'a>> + 'a {
        let kind = self.kind;
        self.cells.iter().map(move |cell| match (cell.as_deref(), kind) {
            (None, _) => Cell::Missing,
            (Some(raw), ColumnKind::Numeric) => {
                parse_number(raw).map_or(Cell::Missing, Cell::Number)
            }
            (Some(raw), ColumnKind::Text) => Cell::Text(raw),
        })
    }

    /// Present answers as they were written, missing ones dropped.
    pub fn present_text(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.cells.iter().filter_map(|c| c.as_deref())
    }
}
