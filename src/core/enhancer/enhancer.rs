//! Strategy-aware facade over the gateway

use super::options::EnhancedOptions;
use crate::core::classifier::ErrorKind;
use crate::core::gateway::{Gateway, GatewayResponse, NO_PROVIDER};
use crate::core::health::ProviderHealth;
use crate::core::router::availability_score;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Provider and model reported by simulated failures
pub const TEST_PROVIDER: &str = "test";

/// Adds strategy selection, fault injection and concurrent batches to a [`Gateway`]
#[derive(Debug, Clone)]
pub struct GatewayEnhancer {
    gateway: Arc<Gateway>,
}

impl GatewayEnhancer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Process one input with the options' strategy and overrides
    pub async fn process_with_smart_fallback(
        &self,
        task_type: &str,
        input: &str,
        options: &EnhancedOptions,
    ) -> GatewayResponse {
        if let Some(kind) = options.simulated_error() {
            info!(task_type = task_type, kind = %kind, "Test mode, simulating failure");
            return simulated_failure(task_type, kind);
        }

        self.gateway
            .process_with_options(task_type, input, &options.to_process_options())
            .await
    }

    /// Process every input concurrently; results come back in input order.
    ///
    /// Fan-out is unbounded here. Each provider's dispatcher bounds the real
    /// concurrency.
    pub async fn process_batch_with_smart_fallback(
        &self,
        task_type: &str,
        inputs: &[String],
        options: &EnhancedOptions,
    ) -> Vec<GatewayResponse> {
        let tasks = inputs.iter().enumerate().map(|(index, input)| {
            let enhancer = self.clone();
            let task_type = task_type.to_string();
            let input = input.clone();
            let options = options.clone();
            async move {
                let handle = tokio::spawn(async move {
                    enhancer
                        .process_with_smart_fallback(&task_type, &input, &options)
                        .await
                });
                let response = match handle.await {
                    Ok(response) => response,
                    Err(err) => {
                        warn!(index = index, error = %err, "Batch item did not complete");
                        GatewayResponse::failure(
                            NO_PROVIDER,
                            NO_PROVIDER,
                            ErrorKind::Unknown,
                            format!("Error processing input {}: {}", index, err),
                        )
                    }
                };
                (index, response)
            }
        });

        let mut results = join_all(tasks).await;
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, response)| response).collect()
    }

    pub async fn available_providers(&self) -> Vec<String> {
        self.gateway.available_providers().await
    }

    pub fn available_models(&self) -> HashMap<String, Vec<String>> {
        self.gateway.available_models()
    }

    pub fn providers_health(&self) -> HashMap<String, ProviderHealth> {
        self.gateway.health_snapshot()
    }

    /// Providers with health records ranked by availability, success rate and latency
    pub fn providers_by_health_score(&self) -> Vec<(String, f64)> {
        self.gateway
            .state()
            .health
            .rank_by(|_, health| availability_score(health))
    }
}

fn simulated_failure(task_type: &str, kind: ErrorKind) -> GatewayResponse {
    GatewayResponse::failure(
        TEST_PROVIDER,
        TEST_PROVIDER,
        kind,
        format!(
            "Simulated error for task type {}: {}",
            task_type,
            kind.user_message()
        ),
    )
}
