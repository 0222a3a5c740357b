//! Fallback loop configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which providers a fallback sequence refuses to reselect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackExclusion {
    /// Every provider tried during the request is excluded
    #[default]
    Cumulative,
    /// Only the provider that failed first is excluded
    OriginalOnly,
}

/// Fallback configuration
///
/// Defaults:
/// - max_retries: 3
/// - retry_delay_ms: 500 (multiplied by the attempt number)
/// - exclusion: cumulative
/// - request_timeout_ms: 180000
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Fallback attempts after the initial failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Exclusion policy
    #[serde(default)]
    pub exclusion: FallbackExclusion,
    /// Deadline for a single provider invocation
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            exclusion: FallbackExclusion::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl FallbackConfig {
    /// Delay before the given fallback attempt (1-based); the first attempt has none
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            Duration::from_millis(self.retry_delay_ms * u64::from(attempt - 1))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
