//! Logging Infrastructure
//!
//! Structured logging setup: stdout by default, daily rolling file when a log
//! directory is configured and exists.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger at `info`
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Build the filter: `RUST_LOG` wins, otherwise `log_level` (default info)
pub fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the logger with optional file output
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "queue-engine");
            if subscriber.with_writer(file_appender).try_init().is_err() {
                tracing::debug!("Logger already initialized");
            }
            return;
        }
        eprintln!("Log directory {} does not exist, logging to stdout", dir);
    }

    if subscriber.try_init().is_err() {
        tracing::debug!("Logger already initialized");
    }
}
