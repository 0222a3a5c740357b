//! Health monitor configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Health window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Cap on the rolling request counter
    #[serde(default = "default_window_size")]
    pub window_size: u32,
    /// Requests needed before rates are recalculated
    #[serde(default = "default_min_sample")]
    pub min_sample: u32,
    /// Error rate above which the provider is marked unavailable
    #[serde(default = "default_unavailable_error_rate")]
    pub unavailable_error_rate: f64,
    /// EWMA weight given to a new latency sample
    #[serde(default = "default_latency_smoothing")]
    pub latency_smoothing: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            min_sample: default_min_sample(),
            unavailable_error_rate: default_unavailable_error_rate(),
            latency_smoothing: default_latency_smoothing(),
        }
    }
}
