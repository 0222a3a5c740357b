//! Logging setup
//!
//! Installs a `tracing_subscriber` formatter driven by [`LoggingConfig`].
//! `RUST_LOG` always wins over the configured level when it is set.

use crate::config::LoggingConfig;
use crate::utils::error::{GatewayError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Returns an error instead of panicking when a subscriber is already installed,
/// so tests and embedding applications can call it more than once.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| GatewayError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| GatewayError::internal(format!("Failed to install subscriber: {}", e)))
}
