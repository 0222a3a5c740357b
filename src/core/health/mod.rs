//! Provider health monitoring
//!
//! Rolling per-provider statistics derived from reported outcomes: success and
//! error rates over a bounded window, an EWMA of latency, and an availability
//! flag that trips when the error rate stays above a threshold.

mod monitor;
mod types;

pub use monitor::HealthMonitor;
pub use types::ProviderHealth;
