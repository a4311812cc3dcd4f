//! Local runner for the upload handler.
//!
//! Reads one gateway event (JSON) from a file or stdin, runs it through
//! `handle_event` and prints the response JSON on stdout. Useful for
//! replaying captured events without deploying anything.

use anyhow::{Context, Result};
use clap::Parser;
use seminar_report::{handle_event, ReportConfig, UploadEvent};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Run the seminar-report upload handler on a saved event.
#[derive(Parser, Debug)]
#[command(name = "seminar-handler", version)]
struct Cli {
    /// Event JSON file; reads stdin when omitted.
    event: Option<PathBuf>,

    /// Attachment filename used in Content-Disposition.
    #[arg(long, env = "SEMINAR_REPORT_ATTACHMENT", default_value = "seminar_summary.pdf")]
    attachment: String,

    /// Largest accepted decoded upload, in bytes.
    #[arg(long, env = "SEMINAR_REPORT_MAX_UPLOAD", default_value_t = seminar_report::config::DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload: usize,

    /// Pretty-print the response.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let raw = match &cli.event {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read event from stdin")?;
            buf
        }
    };
    let event: UploadEvent = serde_json::from_str(&raw).context("Event is not valid JSON")?;

    let config = ReportConfig::builder()
        .attachment_filename(cli.attachment)
        .max_upload_bytes(cli.max_upload)
        .build()
        .context("Invalid configuration")?;

    let response = handle_event(&event, &config).await;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("Failed to serialize response")?;
    println!("{json}");

    Ok(())
}
