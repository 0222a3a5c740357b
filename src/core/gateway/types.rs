//! Caller-facing request options and responses

use crate::core::classifier::ErrorKind;
use crate::core::providers::CompletionResult;
use crate::core::router::SelectionStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider and model reported when no provider was involved
pub const NO_PROVIDER: &str = "none";

/// Per-request knobs for [`Gateway::process_with_options`](super::Gateway::process_with_options)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Model used instead of the table entry, for every attempt
    pub model_override: Option<String>,
    /// Provider used for the first attempt, bypassing selection
    pub preferred_provider: Option<String>,
    #[serde(default)]
    pub strategy: SelectionStrategy,
    /// Write successful responses to the cache
    #[serde(default = "default_cache_results")]
    pub cache_results: bool,
}

fn default_cache_results() -> bool {
    true
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            model_override: None,
            preferred_provider: None,
            strategy: SelectionStrategy::default(),
            cache_results: true,
        }
    }
}

impl ProcessOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_results = false;
        self
    }
}

/// Result of one gateway request.
///
/// Failures are values: `success` is false and `error_kind` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub text: String,
    pub provider: String,
    pub model: String,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub latency_ms: Option<f64>,
    pub quality_score: Option<f64>,
    pub from_cache: bool,
    pub was_failover: bool,
    pub was_retry: bool,
    pub processing_time_ms: Option<f64>,
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl GatewayResponse {
    /// Failure that never reached a provider, or that spans several
    pub fn failure(
        provider: impl Into<String>,
        model: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            text: String::new(),
            provider: provider.into(),
            model: model.into(),
            error_kind: Some(kind),
            error: Some(message.into()),
            latency_ms: None,
            quality_score: None,
            from_cache: false,
            was_failover: false,
            was_retry: false,
            processing_time_ms: None,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    /// Terminal response after every fallback attempt failed
    pub fn all_failed(task_type: &str, attempts: &[AttemptSummary]) -> Self {
        let mut message = format!("All providers failed for task type {}", task_type);
        if !attempts.is_empty() {
            let tried: Vec<String> = attempts.iter().map(ToString::to_string).collect();
            message.push_str(&format!(" (tried: {})", tried.join(", ")));
        }
        let mut response = Self::failure(NO_PROVIDER, NO_PROVIDER, ErrorKind::AllProvidersFailed, message);
        response.was_failover = true;
        response
    }

    /// Copy served from the cache for a new request
    pub(crate) fn served_from_cache(mut self, request_id: Uuid) -> Self {
        self.from_cache = true;
        self.request_id = request_id;
        self.timestamp = Utc::now();
        self
    }

    pub(crate) fn finish(mut self, request_id: Uuid, processing_time_ms: f64) -> Self {
        self.request_id = request_id;
        self.processing_time_ms = Some(processing_time_ms);
        self
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }
}

impl From<CompletionResult> for GatewayResponse {
    fn from(result: CompletionResult) -> Self {
        Self {
            success: result.success,
            text: result.text,
            provider: result.provider,
            model: result.model,
            error_kind: result.error_kind,
            error: result.error,
            latency_ms: result.latency_ms,
            quality_score: result.quality_score,
            from_cache: false,
            was_failover: false,
            was_retry: result.was_retry,
            processing_time_ms: None,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }
}

/// One failed attempt, kept for the terminal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptSummary {
    pub provider: String,
    pub kind: ErrorKind,
}

impl AttemptSummary {
    pub fn new(provider: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            provider: provider.into(),
            kind,
        }
    }

    pub(crate) fn from_result(result: &CompletionResult) -> Self {
        Self::new(
            result.provider.clone(),
            result.error_kind.unwrap_or(ErrorKind::Unknown),
        )
    }
}

impl std::fmt::Display for AttemptSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.kind)
    }
}
