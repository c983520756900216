//! Logging setup for long-running processes.

use tracing_subscriber::{EnvFilter, fmt};

use taskforge_core::config::LoggingConfig;

/// Initializes tracing for an embedding application.
///
/// The `RUST_LOG` environment variable wins over the configured level.
/// Call once, early; a second call panics inside `tracing-subscriber`,
/// so embedding applications with their own subscriber should skip this
/// and install theirs instead.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}
