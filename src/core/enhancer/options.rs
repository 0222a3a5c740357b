//! Options accepted by the enhancer

use crate::core::classifier::ErrorKind;
use crate::core::gateway::ProcessOptions;
use crate::core::router::SelectionStrategy;
use serde::{Deserialize, Serialize};

/// Options for [`GatewayEnhancer::process_with_smart_fallback`](super::GatewayEnhancer::process_with_smart_fallback)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedOptions {
    #[serde(default)]
    pub strategy: SelectionStrategy,
    pub preferred_provider: Option<String>,
    pub model_override: Option<String>,
    #[serde(default = "default_cache_results")]
    pub cache_results: bool,
    /// Fault injection: with `test_error` set, return that failure without
    /// touching providers, cache or health
    #[serde(default)]
    pub test_mode: bool,
    pub test_error: Option<ErrorKind>,
}

fn default_cache_results() -> bool {
    true
}

impl Default for EnhancedOptions {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            preferred_provider: None,
            model_override: None,
            cache_results: true,
            test_mode: false,
            test_error: None,
        }
    }
}

impl EnhancedOptions {
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn with_cache(mut self, cache_results: bool) -> Self {
        self.cache_results = cache_results;
        self
    }

    /// Enable fault injection for the given kind
    pub fn simulate(mut self, kind: ErrorKind) -> Self {
        self.test_mode = true;
        self.test_error = Some(kind);
        self
    }

    /// The error to simulate, if fault injection is active
    pub fn simulated_error(&self) -> Option<ErrorKind> {
        self.test_error.filter(|_| self.test_mode)
    }

    pub fn to_process_options(&self) -> ProcessOptions {
        ProcessOptions {
            model_override: self.model_override.clone(),
            preferred_provider: self.preferred_provider.clone(),
            strategy: self.strategy,
            cache_results: self.cache_results,
        }
    }
}
