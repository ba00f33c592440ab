//! Tracing/logging initialization.

use crate::config::LoggingConfig;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr so
/// stdout stays reserved for CSV output. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);

    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
