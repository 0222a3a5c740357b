//! Top-level relay configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelayConfig {
    /// Model per task type and provider
    #[serde(default)]
    pub models: ModelTable,
    /// Priority weight per task type and provider
    #[serde(default)]
    pub priorities: PriorityTable,
    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,
    /// Fallback loop
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Health window
    #[serde(default)]
    pub health: HealthConfig,
    /// Per-provider dispatcher defaults
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}
