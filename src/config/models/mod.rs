//! Configuration data models
//!
//! This module defines all configuration structures used by the relay.

pub mod cache;
pub mod dispatcher;
pub mod fallback;
pub mod health;
pub mod logging;
pub mod relay;
pub mod tables;

pub use cache::*;
pub use dispatcher::*;
pub use fallback::*;
pub use health::*;
pub use logging::*;
pub use relay::*;
pub use tables::*;

/// Default cache TTL in seconds
pub fn default_cache_ttl() -> u64 {
    3600
}

/// Default cache max size
pub fn default_cache_max_size() -> usize {
    1000
}

/// Default fallback attempts after the initial failure
pub fn default_max_retries() -> u32 {
    3
}

/// Default delay unit between fallback attempts
pub fn default_retry_delay_ms() -> u64 {
    500
}

/// Default per-invocation deadline at the gateway layer
pub fn default_request_timeout_ms() -> u64 {
    180_000
}

/// Default health window size
pub fn default_window_size() -> u32 {
    100
}

/// Default minimum sample before rates are trusted
pub fn default_min_sample() -> u32 {
    5
}

/// Default error rate above which a provider is unavailable
pub fn default_unavailable_error_rate() -> f64 {
    0.8
}

/// Default weight of a new latency sample
pub fn default_latency_smoothing() -> f64 {
    0.3
}

/// Default concurrency cap per provider
pub fn default_max_concurrent() -> usize {
    12
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
