//! Per-provider health monitor

use super::types::ProviderHealth;
use crate::config::HealthConfig;
use crate::core::classifier::ErrorKind;
use chrono::Utc;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Tracks rolling outcome statistics per provider.
///
/// Records live in a `DashMap`, so concurrent updates to the same provider are
/// serialized on that entry while other providers proceed independently.
#[derive(Debug)]
pub struct HealthMonitor {
    config: HealthConfig,
    records: DashMap<String, ProviderHealth>,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

impl HealthMonitor {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            records: DashMap::new(),
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Fold one invocation outcome into the provider's window and return the
    /// updated record.
    pub fn record_outcome(
        &self,
        provider: &str,
        success: bool,
        latency_ms: Option<f64>,
        error_kind: Option<ErrorKind>,
    ) -> ProviderHealth {
        let mut entry = self.records.entry(provider.to_string()).or_default();
        let health = entry.value_mut();
        let was_available = health.available;

        let window = f64::from(self.config.window_size);
        let min_sample = f64::from(self.config.min_sample);

        let mut requests = health.recent_requests + 1.0;
        let mut errors = health.recent_errors + if success { 0.0 } else { 1.0 };
        if requests > window {
            // Both counters shrink by one factor so the error ratio survives.
            let scale = window / requests;
            requests = window;
            errors *= scale;
        }
        health.recent_requests = requests;
        health.recent_errors = errors;

        if requests >= min_sample {
            health.error_rate = errors / requests;
            health.success_rate = 1.0 - health.error_rate;
        }

        let now = Utc::now();
        if success {
            health.last_used_at = Some(now);
            if let Some(latency) = latency_ms.filter(|l| *l > 0.0) {
                let weight = self.config.latency_smoothing;
                health.average_latency_ms = Some(match health.average_latency_ms {
                    Some(avg) => avg * (1.0 - weight) + latency * weight,
                    None => latency,
                });
            }
        } else {
            health.last_error_at = Some(now);
            health.last_error_kind = error_kind;
            warn!(
                provider = provider,
                error_kind = ?error_kind,
                error_rate = health.error_rate,
                "Provider call failed"
            );
        }

        health.available =
            !(requests >= min_sample && health.error_rate > self.config.unavailable_error_rate);

        match (was_available, health.available) {
            (true, false) => warn!(
                provider = provider,
                error_rate = health.error_rate,
                "Provider marked unavailable by health window"
            ),
            (false, true) => info!(provider = provider, "Provider available again"),
            _ => {}
        }

        health.clone()
    }

    /// Snapshot of one provider's record
    pub fn get(&self, provider: &str) -> Option<ProviderHealth> {
        self.records.get(provider).map(|r| r.value().clone())
    }

    /// Snapshot of every tracked provider
    pub fn get_all(&self) -> HashMap<String, ProviderHealth> {
        self.records
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Availability by the health window; unknown providers count as available
    pub fn is_available(&self, provider: &str) -> bool {
        self.records
            .get(provider)
            .map(|r| r.available)
            .unwrap_or(true)
    }

    /// Restore every tracked provider to its default record
    pub fn reset(&self) {
        for mut record in self.records.iter_mut() {
            *record.value_mut() = ProviderHealth::default();
        }
        debug!("Health records reset");
    }

    /// Score every tracked provider and return them best first.
    ///
    /// Equal scores are ordered by provider name.
    pub fn rank_by<F>(&self, score_fn: F) -> Vec<(String, f64)>
    where
        F: Fn(&str, &ProviderHealth) -> f64,
    {
        let mut ranked: Vec<(String, f64)> = self
            .records
            .iter()
            .map(|r| (r.key().clone(), score_fn(r.key(), r.value())))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
