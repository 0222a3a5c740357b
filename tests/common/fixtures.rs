//! Test fixtures and configuration factories

use llm_relay::config::{FallbackExclusion, PriorityTable};
use llm_relay::{DispatcherConfig, RelayConfig};

/// The five providers the default tables know about
pub const PROVIDER_NAMES: [&str; 5] = ["openai", "anthropic", "ollama", "lmstudio", "local"];

/// Factory for relay configurations
pub struct ConfigFactory;

impl ConfigFactory {
    /// Defaults with short fallback delays
    pub fn create() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.fallback.retry_delay_ms = 10;
        config
    }

    /// Defaults where `provider` ranks first for `task_type`
    pub fn preferring(task_type: &str, provider: &str) -> RelayConfig {
        let mut config = Self::create();
        config.priorities = PriorityTable::default().with_weight(task_type, provider, 99.0);
        for other in PROVIDER_NAMES.iter().filter(|p| **p != provider) {
            config.priorities = config.priorities.with_weight(task_type, *other, 10.0);
        }
        config
    }

    /// Defaults with single-exclusion fallback
    pub fn original_only() -> RelayConfig {
        let mut config = Self::create();
        config.fallback.exclusion = FallbackExclusion::OriginalOnly;
        config
    }

    /// Dispatcher with a small cap and no pacing
    pub fn dispatcher(max_concurrent: usize) -> DispatcherConfig {
        DispatcherConfig {
            max_concurrent,
            dispatch_pacing_ms: 0,
            reschedule_delay_ms: 1,
            ..DispatcherConfig::default()
        }
    }
}
