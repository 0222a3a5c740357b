//! Configuration management for the relay
//!
//! This module handles loading, validation, and serialization of the relay
//! configuration. Files are YAML; environment variables prefixed `RELAY_`
//! override scalar settings.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Main configuration struct for the relay
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Relay configuration
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GatewayError::not_found(path.display().to_string()),
            _ => GatewayError::config(format!("Failed to read config file: {}", e)),
        })?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let relay: RelayConfig = serde_yaml::from_str(content)
            .map_err(|e| GatewayError::config(format!("Failed to parse config: {}", e)))?;

        let config = Self { relay };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override scalar settings from `RELAY_*` variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        let relay = &mut self.relay;
        env_override("RELAY_CACHE_TTL", &mut relay.cache.ttl)?;
        env_override("RELAY_CACHE_MAX_SIZE", &mut relay.cache.max_size)?;
        env_override("RELAY_CACHE_ENABLED", &mut relay.cache.enabled)?;
        env_override("RELAY_MAX_RETRIES", &mut relay.fallback.max_retries)?;
        env_override("RELAY_RETRY_DELAY_MS", &mut relay.fallback.retry_delay_ms)?;
        env_override("RELAY_REQUEST_TIMEOUT_MS", &mut relay.fallback.request_timeout_ms)?;
        env_override("RELAY_MAX_CONCURRENT", &mut relay.dispatcher.max_concurrent)?;
        env_override("RELAY_LOG_LEVEL", &mut relay.logging.level)?;
        env_override("RELAY_LOG_JSON", &mut relay.logging.json)?;
        Ok(())
    }

    /// Get the model table
    pub fn models(&self) -> &ModelTable {
        &self.relay.models
    }

    /// Get the priority table
    pub fn priorities(&self) -> &PriorityTable {
        &self.relay.priorities
    }

    /// Get logging settings
    pub fn logging(&self) -> &LoggingConfig {
        &self.relay.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.relay.validate()
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.relay)
            .map_err(|e| GatewayError::config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn env_override<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(raw) = std::env::var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| GatewayError::config(format!("Invalid value for {}: {}", key, e)))?;
        debug!("Applied {} from environment", key);
    }
    Ok(())
}
