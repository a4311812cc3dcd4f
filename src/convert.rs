//! Report generation entry points.
//!
//! ## One pipeline, many doors
//!
//! [`run`] is the only place where parsing, extraction and rendering are
//! chained together. Everything else wraps it: [`generate_report`] for bytes
//! in memory, [`convert_to_file`] for the CLI, and the upload handler in
//! [`crate::handler`]. The pipeline is CPU-bound and synchronous; the async
//! wrappers move it onto tokio's blocking pool.

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::output::{ReportOutput, ReportStats};
use crate::pipeline::extract::FeedbackMatrix;
use crate::pipeline::input::{CsvSource, FileSink, InMemoryCsv, LocalCsv, ReportSink};
use crate::pipeline::render::{self, PAGE_COUNT};
use crate::pipeline::table::SurveyTable;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Turn raw CSV bytes into a report.
///
/// # Errors
/// - [`ReportError::EmptyCsv`] / [`ReportError::CsvParse`] for unreadable CSV
/// - [`ReportError::TooFewColumns`] / [`ReportError::UnexpectedColumnShape`]
///   when the survey does not have the expected layout
/// - [`ReportError::RenderFailed`] if the PDF cannot be serialised
pub fn generate_report(csv: &[u8], config: &ReportConfig) -> Result<ReportOutput, ReportError> {
    let start = Instant::now();

    let table = SurveyTable::parse(csv)?;
    debug!(
        "Parsed survey: {} column(s), {} response(s)",
        table.column_count(),
        table.row_count()
    );

    let matrix = FeedbackMatrix::extract(&table, config)?;
    let mean = matrix.mean_score();
    debug!(
        "Extracted {} scored / {} missing cell(s), mean {}",
        matrix.scored_cells(),
        matrix.missing_cells(),
        mean
    );

    let pdf = render::render_report(&table, &matrix, mean, config)?;

    let stats = ReportStats {
        responses: table.row_count(),
        scored_cells: matrix.scored_cells(),
        missing_cells: matrix.missing_cells(),
        mean_score: mean.value(),
        page_count: PAGE_COUNT,
        pdf_bytes: pdf.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Ok(ReportOutput { pdf, stats })
}

/// Read from `source`, render, write to `sink`.
pub fn run(
    source: &dyn CsvSource,
    sink: &mut dyn ReportSink,
    config: &ReportConfig,
) -> Result<ReportStats, ReportError> {
    info!("Generating report from {}", source.describe());
    let csv = source.read_csv()?;
    let output = generate_report(&csv, config)?;
    sink.write_pdf(&output.pdf)?;

    info!(
        "Report complete: {} response(s), mean {}, {} bytes, {}ms",
        output.stats.responses,
        output.stats.mean_display(),
        output.stats.pdf_bytes,
        output.stats.duration_ms
    );
    Ok(output.stats)
}

/// Render the CSV at `input` into a PDF at `output`.
///
/// The write is atomic (temp file + rename); parent directories are created.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportStats, ReportError> {
    let source = LocalCsv::new(input.as_ref());
    let mut sink = FileSink::new(output.as_ref());
    let config = config.clone();

    tokio::task::spawn_blocking(move || run(&source, &mut sink, &config))
        .await
        .map_err(|e| ReportError::Internal(format!("report task failed: {e}")))?
}

/// Render a report from CSV bytes already in memory.
pub async fn convert_from_bytes(
    csv: impl Into<Vec<u8>>,
    config: &ReportConfig,
) -> Result<ReportOutput, ReportError> {
    let csv = csv.into();
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        let source = InMemoryCsv::new("upload", csv);
        let mut pdf: Vec<u8> = Vec::new();
        let stats = run(&source, &mut pdf, &config)?;
        Ok::<_, ReportError>(ReportOutput { pdf, stats })
    })
    .await
    .map_err(|e| ReportError::Internal(format!("report task failed: {e}")))?
}

/// Synchronous wrapper around [`convert_to_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ReportConfig,
) -> Result<ReportStats, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_to_file(input, output, config))
}
