//! Health record types

use crate::core::classifier::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolling health statistics for one provider
///
/// Until `recent_requests` reaches the minimum sample, the rates keep their
/// optimistic defaults and the provider stays available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub available: bool,
    pub success_rate: f64,
    pub error_rate: f64,
    /// EWMA of successful call latency; `None` until the first timed success
    pub average_latency_ms: Option<f64>,
    /// Requests in the window; fractional once the window has been rescaled
    pub recent_requests: f64,
    /// Failures in the window, scaled together with `recent_requests`
    pub recent_errors: f64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_error_kind: Option<ErrorKind>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            available: true,
            success_rate: 1.0,
            error_rate: 0.0,
            average_latency_ms: None,
            recent_requests: 0.0,
            recent_errors: 0.0,
            last_used_at: None,
            last_error_at: None,
            last_error_kind: None,
        }
    }
}
