//! Logging initialization for TUI mode.
//!
//! Everything goes to a daily-rolling JSON file under the app data
//! directory — never to stdout, which ratatui owns while the alternate
//! screen is active. Standard `log` macros are bridged into `tracing`.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize file-only logging.
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of
/// the application so buffered logs are flushed on shutdown.
pub fn init_tui(data_dir: Option<PathBuf>) -> WorkerGuard {
    let log_dir = data_dir
        .or_else(|| dirs::data_dir().map(|d| d.join("booklens")))
        .unwrap_or_else(|| PathBuf::from("data"))
        .join("logs");

    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(&log_dir) {
            eprintln!("Failed to create logs directory: {e}");
        }
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "booklens.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON format for easy parsing
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(file_layer).init();

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {e}");
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join("booklens.log")
    );

    guard
}
