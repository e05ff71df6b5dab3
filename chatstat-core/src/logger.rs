//! Tracing initialization for the bot process.

use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber: one fmt layer written to both stdout and the
/// given log file, filtered by `RUST_LOG` (default `info`).
///
/// Call after loading `.env`, otherwise a `RUST_LOG` from the file is not picked up.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout.and(Arc::new(log_file)))
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
