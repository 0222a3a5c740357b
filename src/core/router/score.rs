//! Provider scoring

use crate::core::health::ProviderHealth;

/// Flat bonus when latency has not been measured yet
const UNKNOWN_LATENCY_BONUS: f64 = 30.0;
/// Upper bound of the load penalty applied during fallback
const MAX_RETRY_PENALTY: f64 = 20.0;
/// Upper bound of the latency penalty in [`availability_score`]
const MAX_LATENCY_PENALTY: f64 = 20.0;

/// Comparable score for one candidate; higher is better.
///
/// `priority*100 + success_rate*50 + latency_bonus - retry_penalty`, where the
/// latency bonus shrinks by 1 per 100ms down to 0 and the retry penalty
/// (`recent_requests/5`, capped at 20) only applies once a request is retrying.
/// A provider without a record scores as a fresh, healthy one.
pub fn provider_score(health: Option<&ProviderHealth>, priority_weight: f64, retry_count: u32) -> f64 {
    let fresh = ProviderHealth::default();
    let health = health.unwrap_or(&fresh);

    let latency_bonus = match health.average_latency_ms {
        Some(latency) if latency > 0.0 => (UNKNOWN_LATENCY_BONUS - latency / 100.0).max(0.0),
        _ => UNKNOWN_LATENCY_BONUS,
    };

    let retry_penalty = if retry_count > 0 {
        (health.recent_requests / 5.0).min(MAX_RETRY_PENALTY)
    } else {
        0.0
    };

    priority_weight * 100.0 + health.success_rate * 50.0 + latency_bonus - retry_penalty
}

/// Task-independent score used for health overviews.
///
/// 100 for being available, up to 50 for success rate, minus up to 20 for latency.
pub fn availability_score(health: &ProviderHealth) -> f64 {
    let availability = if health.available { 100.0 } else { 0.0 };
    let latency_penalty = health
        .average_latency_ms
        .map(|l| (l / 50.0).min(MAX_LATENCY_PENALTY))
        .unwrap_or(0.0);
    availability + health.success_rate * 50.0 - latency_penalty
}
