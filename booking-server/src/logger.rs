//! Logging Infrastructure
//!
//! `EnvFilter` from `RUST_LOG` (or the configured level), optional JSON
//! output, optional daily-rolling files.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "booking_server=info,booking_engine=info,tower_http=info";

/// Initialize the global subscriber
pub fn init_logger(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    // File output only when the directory exists
    let file_appender = log_dir
        .map(Path::new)
        .filter(|p| p.exists())
        .and_then(|p| p.to_str())
        .map(|dir| tracing_appender::rolling::daily(dir, "booking-server"));

    match (file_appender, json) {
        (Some(appender), true) => builder.json().with_writer(appender).init(),
        (Some(appender), false) => builder.with_ansi(false).with_writer(appender).init(),
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }
}
