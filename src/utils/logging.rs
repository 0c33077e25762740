//! Structured logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the application. `init_logging` is a convenience for binaries, tests and
//! benches that want the configured level and format without extra wiring.

use crate::config::LoggingConfig;
use crate::error::{Result, TagError};
use crate::utils::metrics::init_metrics;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `tracing` subscriber from the logging configuration
/// and start metrics collection
///
/// `RUST_LOG` takes precedence over the configured level when set.
///
/// # Errors
/// Returns `TagError::Configuration` if a global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_ascii_lowercase()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| {
        TagError::Configuration(format!(
            "Failed to install logging for {}: {e}",
            config.app_name
        ))
    })?;

    tracing::info!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    init_metrics();
    Ok(())
}
