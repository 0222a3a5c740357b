//! Configuration validation
//!
//! Range checks for every configuration section.

use super::models::*;
use crate::utils::error::{GatewayError, Result};
use tracing::debug;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        debug!("Validating relay configuration");

        if self.models.0.is_empty() {
            return Err(GatewayError::config("Model table cannot be empty"));
        }

        self.cache
            .validate()
            .map_err(|e| GatewayError::config(format!("Cache config error: {}", e)))?;
        self.fallback
            .validate()
            .map_err(|e| GatewayError::config(format!("Fallback config error: {}", e)))?;
        self.health
            .validate()
            .map_err(|e| GatewayError::config(format!("Health config error: {}", e)))?;
        self.dispatcher
            .validate()
            .map_err(|e| GatewayError::config(format!("Dispatcher config error: {}", e)))?;

        for (task_type, row) in &self.priorities.0 {
            if let Some((provider, weight)) = row.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
                return Err(GatewayError::config(format!(
                    "Priority for {} on {} must be a non-negative number, got {}",
                    provider, task_type, weight
                )));
            }
        }

        debug!("Relay configuration validation completed");
        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled && self.max_size == 0 {
            return Err(GatewayError::validation(
                "max_size must be greater than 0 when caching is enabled",
            ));
        }
        if self.enabled && self.ttl == 0 {
            return Err(GatewayError::validation(
                "ttl must be greater than 0 when caching is enabled",
            ));
        }
        Ok(())
    }
}

impl Validate for FallbackConfig {
    fn validate(&self) -> Result<()> {
        if self.max_retries > 20 {
            return Err(GatewayError::validation("max_retries should not exceed 20"));
        }
        if self.request_timeout_ms == 0 {
            return Err(GatewayError::validation(
                "request_timeout_ms must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Validate for HealthConfig {
    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(GatewayError::validation("window_size must be greater than 0"));
        }
        if self.min_sample > self.window_size {
            return Err(GatewayError::validation(format!(
                "min_sample ({}) cannot exceed window_size ({})",
                self.min_sample, self.window_size
            )));
        }
        if !(0.0..=1.0).contains(&self.unavailable_error_rate) {
            return Err(GatewayError::validation(
                "unavailable_error_rate must be between 0 and 1",
            ));
        }
        if !(self.latency_smoothing > 0.0 && self.latency_smoothing <= 1.0) {
            return Err(GatewayError::validation(
                "latency_smoothing must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Validate for DispatcherConfig {
    fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(GatewayError::validation(
                "max_concurrent must be greater than 0",
            ));
        }
        if self.drain_batch_size == 0 {
            return Err(GatewayError::validation(
                "drain_batch_size must be greater than 0",
            ));
        }
        if self.failure_threshold == 0 {
            return Err(GatewayError::validation(
                "failure_threshold must be greater than 0",
            ));
        }
        if self.normal_timeout_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(GatewayError::validation("timeouts must be greater than 0"));
        }
        Ok(())
    }
}
