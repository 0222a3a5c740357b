//! Bounded-concurrency dispatcher configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-provider dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Maximum simultaneous calls to the backend
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Queue items dispatched per drain pass
    #[serde(default = "default_drain_batch_size")]
    pub drain_batch_size: usize,
    /// Pause between dispatches inside one drain pass
    #[serde(default = "default_dispatch_pacing_ms")]
    pub dispatch_pacing_ms: u64,
    /// Pause before draining again when items remain
    #[serde(default = "default_reschedule_delay_ms")]
    pub reschedule_delay_ms: u64,
    /// Timeout for regular requests
    #[serde(default = "default_normal_timeout_ms")]
    pub normal_timeout_ms: u64,
    /// Timeout for probe/load requests
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Token budget forced on probe/load requests
    #[serde(default = "default_probe_max_tokens")]
    pub probe_max_tokens: u32,
    /// Prompts shorter than this are probe/load requests
    #[serde(default = "default_probe_prompt_chars")]
    pub probe_prompt_chars: usize,
    /// Requests asking for at most this many tokens are probe/load requests
    #[serde(default = "default_probe_token_threshold")]
    pub probe_token_threshold: u32,
    /// Marker that flags a prompt as load-test traffic
    #[serde(default = "default_probe_marker")]
    pub probe_marker: String,
    /// Models preferred for probe/load requests when the backend has them
    #[serde(default)]
    pub fast_models: Vec<String>,
    /// Retries inside the dispatcher
    #[serde(default = "default_dispatcher_retries")]
    pub max_retries: u32,
    /// Retry delay unit; retry n waits `retry_delay_ms * (n + 1)`
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Consecutive failures beyond which retries stop under load
    #[serde(default = "default_saturated_failure_limit")]
    pub saturated_failure_limit: u32,
    /// Consecutive failures that mark the provider unavailable
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Cool-down before availability is probed again
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Timeout of the availability probe
    #[serde(default = "default_availability_probe_timeout_ms")]
    pub availability_probe_timeout_ms: u64,
    /// How long a fetched model catalog is trusted
    #[serde(default = "default_catalog_ttl_secs")]
    pub catalog_ttl_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            drain_batch_size: default_drain_batch_size(),
            dispatch_pacing_ms: default_dispatch_pacing_ms(),
            reschedule_delay_ms: default_reschedule_delay_ms(),
            normal_timeout_ms: default_normal_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            probe_max_tokens: default_probe_max_tokens(),
            probe_prompt_chars: default_probe_prompt_chars(),
            probe_token_threshold: default_probe_token_threshold(),
            probe_marker: default_probe_marker(),
            fast_models: Vec::new(),
            max_retries: default_dispatcher_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            saturated_failure_limit: default_saturated_failure_limit(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
            availability_probe_timeout_ms: default_availability_probe_timeout_ms(),
            catalog_ttl_secs: default_catalog_ttl_secs(),
        }
    }
}

impl DispatcherConfig {
    pub fn dispatch_pacing(&self) -> Duration {
        Duration::from_millis(self.dispatch_pacing_ms)
    }

    pub fn reschedule_delay(&self) -> Duration {
        Duration::from_millis(self.reschedule_delay_ms)
    }

    pub fn normal_timeout(&self) -> Duration {
        Duration::from_millis(self.normal_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Delay before retry number `retry` (0-based)
    pub fn retry_delay(&self, retry: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms * u64::from(retry + 1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn availability_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.availability_probe_timeout_ms)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }
}

fn default_drain_batch_size() -> usize {
    5
}

fn default_dispatch_pacing_ms() -> u64 {
    20
}

fn default_reschedule_delay_ms() -> u64 {
    5
}

fn default_normal_timeout_ms() -> u64 {
    120_000
}

fn default_probe_timeout_ms() -> u64 {
    15_000
}

fn default_probe_max_tokens() -> u32 {
    30
}

fn default_probe_prompt_chars() -> usize {
    100
}

fn default_probe_token_threshold() -> u32 {
    50
}

fn default_probe_marker() -> String {
    "TEST_LOAD".to_string()
}

fn default_dispatcher_retries() -> u32 {
    2
}

fn default_saturated_failure_limit() -> u32 {
    3
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_cooldown_secs() -> u64 {
    30
}

fn default_availability_probe_timeout_ms() -> u64 {
    3000
}

fn default_catalog_ttl_secs() -> u64 {
    60
}
