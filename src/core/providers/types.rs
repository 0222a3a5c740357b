//! Request and result types shared by providers, dispatchers and the gateway

use crate::core::classifier::ErrorKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generation options passed through to the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stop_sequences: Vec<String>,
    pub system_prompt: Option<String>,
    /// Per-call deadline requested by the caller
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

/// One inference call against one backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub options: CompletionOptions,
    /// Skip the dispatcher's cool-down gate, used by availability probes
    pub bypass_availability_check: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            options: CompletionOptions::default(),
            bypass_availability_check: false,
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }
}

/// What a backend returns on success
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub total_tokens: Option<u32>,
    pub finish_reason: Option<String>,
    /// Retries spent inside the dispatcher before this answer
    #[serde(default)]
    pub retries: u32,
}

impl Completion {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Outcome of one provider invocation as seen by the gateway
///
/// Build through [`CompletionResult::succeeded`] or [`CompletionResult::failed`]
/// so `error_kind` is present exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub success: bool,
    pub text: String,
    pub provider: String,
    pub model: String,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
    pub latency_ms: Option<f64>,
    pub quality_score: Option<f64>,
    pub was_retry: bool,
}

impl CompletionResult {
    pub fn succeeded(provider: impl Into<String>, completion: Completion, latency_ms: f64) -> Self {
        let quality = super::quality::quality_score(&completion.text);
        Self {
            success: true,
            text: completion.text,
            provider: provider.into(),
            model: completion.model,
            error_kind: None,
            error: None,
            latency_ms: Some(latency_ms),
            quality_score: Some(quality),
            was_retry: completion.retries > 0,
        }
    }

    pub fn failed(
        provider: impl Into<String>,
        model: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
        latency_ms: Option<f64>,
    ) -> Self {
        Self {
            success: false,
            text: String::new(),
            provider: provider.into(),
            model: model.into(),
            error_kind: Some(kind),
            error: Some(message.into()),
            latency_ms,
            quality_score: None,
            was_retry: false,
        }
    }
}

/// Dispatcher-level view of a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub is_available: bool,
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub average_latency_ms: f64,
    pub queue_length: usize,
    pub active_requests: usize,
}
