//! Simulated backend for load and failover drills

use super::provider::Provider;
use super::types::{Completion, CompletionRequest};
use crate::core::classifier::RawFailure;
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Backend that answers after a random delay and fails at a configured rate
#[derive(Debug)]
pub struct SimulatedProvider {
    name: String,
    models: Vec<String>,
    min_latency: Duration,
    max_latency: Duration,
    failure_rate: f64,
    failure: RawFailure,
    calls: AtomicU64,
}

impl SimulatedProvider {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let failure = RawFailure::network("ECONNRESET", format!("{} dropped the connection", name));
        Self {
            name,
            models: Vec::new(),
            min_latency: Duration::from_millis(20),
            max_latency: Duration::from_millis(120),
            failure_rate: 0.0,
            failure,
            calls: AtomicU64::new(0),
        }
    }

    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min;
        self.max_latency = max.max(min);
        self
    }

    /// Probability in `[0, 1]` that a call fails
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Failure returned when a call fails
    pub fn with_failure(mut self, failure: RawFailure) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Provider for SimulatedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, RawFailure> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let (delay, fails) = {
            let mut rng = rand::thread_rng();
            let min = self.min_latency.as_millis() as u64;
            let max = self.max_latency.as_millis() as u64;
            (
                Duration::from_millis(rng.gen_range(min..=max)),
                rng.gen_bool(self.failure_rate),
            )
        };
        tokio::time::sleep(delay).await;

        if fails {
            return Err(self.failure.clone());
        }

        let preview: String = request.prompt.chars().take(40).collect();
        Ok(Completion {
            text: format!("[{}:{}] {}", self.name, request.model, preview),
            model: request.model.clone(),
            total_tokens: Some(request.prompt.split_whitespace().count() as u32 + 8),
            finish_reason: Some("stop".to_string()),
            retries: 0,
        })
    }

    async fn list_models(&self) -> Result<Vec<String>, RawFailure> {
        Ok(self.models.clone())
    }
}
