//! CLI binary for seminar-report.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ReportConfig`, runs the pipeline and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use seminar_report::{convert_to_file, ReportConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a survey export
  seminar-report responses.csv summary.pdf

  # Uncompressed content streams (easier to inspect)
  seminar-report --no-compress responses.csv summary.pdf

  # Show what the pipeline is doing
  seminar-report -v responses.csv summary.pdf

EXPECTED INPUT:
  One row per response. Exactly six column headers contain a bracketed tag
  such as "Rate [Methods]"; their answers look like "4: Agree". Columns 7, 8
  and 9 (counting from 1) hold the Key Takeaways, Speaker Strengths and
  Suggestions for Improvement free-text answers.

ENVIRONMENT VARIABLES:
  RUST_LOG                    Override the log filter (e.g. seminar_report=debug)
  SEMINAR_REPORT_VERBOSE      Same as --verbose
  SEMINAR_REPORT_QUIET        Same as --quiet
  SEMINAR_REPORT_NO_COMPRESS  Same as --no-compress
"#;

/// Generate a PDF summary from a seminar feedback survey CSV.
#[derive(Parser, Debug)]
#[command(
    name = "seminar-report",
    version,
    about = "Generate a PDF summary from a seminar feedback survey CSV",
    long_about = "Reads a seminar feedback survey export and writes a five-page PDF: a heatmap \
of every response's ratings, the mean overall score, and digests of the Key Takeaways, \
Speaker Strengths and Suggestions for Improvement answers.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Survey export to read.
    input_csv: PathBuf,

    /// Where to write the PDF report.
    output_pdf: PathBuf,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SEMINAR_REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SEMINAR_REPORT_QUIET", conflicts_with = "verbose")]
    quiet: bool,

    /// Write uncompressed page content streams.
    #[arg(long, env = "SEMINAR_REPORT_NO_COMPRESS")]
    no_compress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ReportConfig::builder()
        .compress(!cli.no_compress)
        .build()
        .context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let stats = convert_to_file(&cli.input_csv, &cli.output_pdf, &config)
        .await
        .with_context(|| format!("Failed to generate report from {}", cli.input_csv.display()))?;

    if !cli.quiet {
        println!("Successfully generated PDF at {}", cli.output_pdf.display());
    }
    tracing::debug!(
        "{} response(s), mean {}, {} bytes in {}ms",
        stats.responses,
        stats.mean_display(),
        stats.pdf_bytes,
        stats.duration_ms
    );

    Ok(())
}
