//! Tracing initialization.

use tracing::Level;

/// Initialize the global tracing subscriber from the configured log level.
///
/// Unrecognized levels fall back to `info`. Safe to call once per process;
/// a second call is a no-op rather than a panic.
pub fn init(log_level: &str) {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
