//! Request processing: cache lookup, selection and the first invocation

use super::state::GatewayState;
use super::types::{GatewayResponse, NO_PROVIDER, ProcessOptions};
use crate::config::{FallbackConfig, ModelTable, RelayConfig};
use crate::core::cache_manager::{CacheKey, CacheStats};
use crate::core::classifier::{ErrorKind, RawFailure, classify};
use crate::core::health::ProviderHealth;
use crate::core::providers::{CompletionRequest, CompletionResult, ProviderRegistry};
use crate::core::router::{ProviderSelector, SelectionStrategy};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::{Instant, timeout};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Orchestrates provider selection, invocation, caching and failover
#[derive(Debug, Clone)]
pub struct Gateway {
    pub(super) registry: ProviderRegistry,
    pub(super) models: ModelTable,
    pub(super) fallback: FallbackConfig,
    pub(super) selector: ProviderSelector,
    pub(super) state: Arc<GatewayState>,
}

/// Per-request values threaded through the fallback loop
pub(super) struct RequestContext<'a> {
    pub task_type: &'a str,
    pub input: &'a str,
    pub options: &'a ProcessOptions,
    pub request_id: Uuid,
    pub started: Instant,
}

impl RequestContext<'_> {
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Gateway {
    /// Create a gateway with its own state
    pub fn new(config: &RelayConfig, registry: ProviderRegistry) -> Self {
        Self::with_state(config, registry, Arc::new(GatewayState::new(config)))
    }

    /// Create a gateway over existing shared state
    pub fn with_state(
        config: &RelayConfig,
        registry: ProviderRegistry,
        state: Arc<GatewayState>,
    ) -> Self {
        let selector = ProviderSelector::new(
            registry.clone(),
            config.priorities.clone(),
            state.health.clone(),
            state.cursor.clone(),
        );
        Self {
            registry,
            models: config.models.clone(),
            fallback: config.fallback.clone(),
            selector,
            state,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    /// Process one input with the priority strategy
    pub async fn process(
        &self,
        task_type: &str,
        input: &str,
        model_override: Option<&str>,
    ) -> GatewayResponse {
        let options = ProcessOptions {
            model_override: model_override.map(str::to_string),
            ..ProcessOptions::default()
        };
        self.process_with_options(task_type, input, &options).await
    }

    /// Process one input. Never fails: errors come back as a response with
    /// `success == false`.
    pub async fn process_with_options(
        &self,
        task_type: &str,
        input: &str,
        options: &ProcessOptions,
    ) -> GatewayResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "process",
            request_id = %request_id,
            task_type = task_type,
            strategy = %options.strategy
        );
        let ctx = RequestContext {
            task_type,
            input,
            options,
            request_id,
            started: Instant::now(),
        };
        self.run(&ctx).instrument(span).await
    }

    async fn run(&self, ctx: &RequestContext<'_>) -> GatewayResponse {
        let key = CacheKey::new(ctx.task_type, ctx.input);
        if let Some(cached) = self.state.cache.get(&key) {
            debug!(provider = %cached.provider, "Serving cached response");
            return cached.served_from_cache(ctx.request_id);
        }

        let provider = match &ctx.options.preferred_provider {
            Some(name) if self.registry.contains(name) => Some(name.clone()),
            Some(name) => {
                warn!(provider = %name, "Preferred provider is not registered");
                return self.finish(
                    ctx,
                    GatewayResponse::failure(
                        name.as_str(),
                        NO_PROVIDER,
                        ErrorKind::ProviderUnavailable,
                        format!("Provider {} is not registered", name),
                    ),
                );
            }
            None => self.selector.select_best_provider(
                ctx.task_type,
                ctx.options.strategy,
                0,
                &HashSet::new(),
            ),
        };

        let Some(provider) = provider else {
            warn!("No provider is available");
            return self.finish(
                ctx,
                GatewayResponse::failure(
                    NO_PROVIDER,
                    NO_PROVIDER,
                    ErrorKind::ProviderUnavailable,
                    "No providers are available",
                ),
            );
        };

        let Some(model) = self.resolve_model(ctx.task_type, &provider, ctx.options) else {
            warn!(provider = %provider, "No model configured for provider");
            return self.finish(
                ctx,
                GatewayResponse::failure(
                    provider.as_str(),
                    NO_PROVIDER,
                    ErrorKind::ModelUnavailable,
                    format!(
                        "No model configured for provider {} and task type {}",
                        provider, ctx.task_type
                    ),
                ),
            );
        };

        info!(provider = %provider, model = %model, "Selected provider");
        let result = self.invoke(&provider, &model, ctx.input).await;
        if result.success {
            let response = self.finish(ctx, GatewayResponse::from(result));
            self.remember(ctx, &key, &response);
            return response;
        }

        let kind = result.error_kind.unwrap_or(ErrorKind::Unknown);
        if !kind.is_retryable() {
            warn!(
                provider = %provider,
                kind = %kind,
                "Error is not retryable, returning it"
            );
            return self.finish(ctx, GatewayResponse::from(result));
        }

        warn!(provider = %provider, kind = %kind, "Provider failed, starting fallback");
        self.run_fallback(ctx, &key, provider, result).await
    }

    /// `override ?? table[task][provider] ?? table["default"][provider]`
    pub(super) fn resolve_model(
        &self,
        task_type: &str,
        provider: &str,
        options: &ProcessOptions,
    ) -> Option<String> {
        options
            .model_override
            .clone()
            .or_else(|| self.models.resolve(task_type, provider).map(str::to_string))
    }

    /// Call one provider under the request deadline and record the outcome
    pub(super) async fn invoke(&self, provider: &str, model: &str, input: &str) -> CompletionResult {
        let Some(backend) = self.registry.get(provider) else {
            return CompletionResult::failed(
                provider,
                model,
                ErrorKind::ProviderUnavailable,
                format!("Provider {} is not registered", provider),
                None,
            );
        };

        let deadline = self.fallback.request_timeout();
        let request = CompletionRequest::new(input, model).with_timeout(deadline);
        let started = Instant::now();
        let outcome = match timeout(deadline, backend.invoke(&request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RawFailure::timeout(deadline)),
        };
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        let health = &self.state.health;

        match outcome {
            Ok(completion) => {
                health.record_outcome(provider, true, Some(latency_ms), None);
                CompletionResult::succeeded(provider, completion, latency_ms)
            }
            Err(failure) => {
                let failure = attribute(failure, provider);
                let kind = classify(&failure);
                health.record_outcome(provider, false, None, Some(kind));
                warn!(
                    provider = provider,
                    model = model,
                    kind = %kind,
                    error = %failure,
                    "Provider invocation failed"
                );
                CompletionResult::failed(provider, model, kind, failure.to_string(), Some(latency_ms))
            }
        }
    }

    pub(super) fn finish(&self, ctx: &RequestContext<'_>, response: GatewayResponse) -> GatewayResponse {
        response.finish(ctx.request_id, ctx.elapsed_ms())
    }

    /// Write a successful response through to the cache
    pub(super) fn remember(&self, ctx: &RequestContext<'_>, key: &CacheKey, response: &GatewayResponse) {
        if ctx.options.cache_results && response.success {
            self.state.cache.put(key.clone(), response.clone());
        }
    }

    /// Process inputs one after another, in order
    pub async fn process_batch(&self, task_type: &str, inputs: &[String]) -> Vec<GatewayResponse> {
        let mut responses = Vec::with_capacity(inputs.len());
        for input in inputs {
            responses.push(self.process(task_type, input, None).await);
        }
        responses
    }

    /// Current health record of every provider that has been used
    pub fn health_snapshot(&self) -> HashMap<String, ProviderHealth> {
        self.state.health.get_all()
    }

    /// Registered providers with their priority score for the task, best first
    pub fn ranked_providers(&self, task_type: &str) -> Vec<(String, f64)> {
        self.ranked_providers_with(task_type, SelectionStrategy::Priority)
    }

    /// Ranking as the given strategy would order it, without advancing any rotation
    pub fn ranked_providers_with(
        &self,
        task_type: &str,
        strategy: SelectionStrategy,
    ) -> Vec<(String, f64)> {
        self.selector.ranked_providers(task_type, strategy, 0)
    }

    /// Providers that pass both the dispatcher check and the health window
    pub async fn available_providers(&self) -> Vec<String> {
        let mut available = Vec::new();
        for provider in self.registry.iter() {
            let name = provider.name();
            if provider.is_available().await && self.state.health.is_available(name) {
                available.push(name.to_string());
            }
        }
        available
    }

    /// Models each registered provider can serve according to the model table
    pub fn available_models(&self) -> HashMap<String, Vec<String>> {
        self.registry
            .names()
            .into_iter()
            .map(|name| {
                let models = self.models.models_for(&name);
                (name, models)
            })
            .collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.state.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.state.cache.clear();
        info!("Response cache cleared");
    }

    pub fn reset_health(&self) {
        self.state.health.reset();
        info!("Provider health reset");
    }
}

/// Attach the provider name to a bare message so provider heuristics apply
fn attribute(failure: RawFailure, provider: &str) -> RawFailure {
    match failure {
        RawFailure::Message {
            text,
            provider: None,
        } => RawFailure::from_provider(provider, text),
        other => other,
    }
}
