//! Provider selection

use super::score::provider_score;
use super::strategy::{RoundRobinCursor, SelectionStrategy};
use crate::config::PriorityTable;
use crate::core::health::HealthMonitor;
use crate::core::providers::ProviderRegistry;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ranks the registered providers for a task and picks one
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    registry: ProviderRegistry,
    priorities: PriorityTable,
    health: Arc<HealthMonitor>,
    cursor: Arc<RoundRobinCursor>,
}

impl ProviderSelector {
    pub fn new(
        registry: ProviderRegistry,
        priorities: PriorityTable,
        health: Arc<HealthMonitor>,
        cursor: Arc<RoundRobinCursor>,
    ) -> Self {
        Self {
            registry,
            priorities,
            health,
            cursor,
        }
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Best provider for the task, skipping every name in `exclude`.
    ///
    /// Returns `None` only when `exclude` covers every registered provider.
    pub fn select_best_provider(
        &self,
        task_type: &str,
        strategy: SelectionStrategy,
        retry_count: u32,
        exclude: &HashSet<String>,
    ) -> Option<String> {
        let candidates: Vec<String> = self
            .registry
            .names()
            .into_iter()
            .filter(|name| !exclude.contains(name))
            .collect();

        if candidates.is_empty() {
            debug!(task_type = task_type, "No candidates left after exclusion");
            return None;
        }

        let eligible = self.eligible(&candidates);
        let chosen = match strategy {
            SelectionStrategy::RoundRobin => {
                let index = self.cursor.advance(eligible.len());
                eligible.get(index).cloned()
            }
            _ => self
                .score(task_type, strategy, retry_count, &eligible)
                .into_iter()
                .next()
                .map(|(name, _)| name),
        };

        match chosen {
            Some(name) => {
                debug!(
                    task_type = task_type,
                    strategy = %strategy,
                    retry_count = retry_count,
                    provider = %name,
                    "Selected provider"
                );
                Some(name)
            }
            None => {
                warn!(
                    task_type = task_type,
                    strategy = %strategy,
                    "Ranking produced no candidate, using first eligible provider"
                );
                candidates.into_iter().next()
            }
        }
    }

    /// `select_best_provider` with the fallback strategy and `current` excluded
    pub fn select_next_provider(
        &self,
        task_type: &str,
        current: &str,
        retry_count: u32,
    ) -> Option<String> {
        let exclude = HashSet::from([current.to_string()]);
        self.select_best_provider(task_type, SelectionStrategy::Fallback, retry_count, &exclude)
    }

    /// Every registered provider with its score, best first.
    ///
    /// Round-robin lists providers in the order the cursor will visit them.
    /// Unlike selection this never filters by availability and never moves the cursor.
    pub fn ranked_providers(
        &self,
        task_type: &str,
        strategy: SelectionStrategy,
        retry_count: u32,
    ) -> Vec<(String, f64)> {
        let names = self.registry.names();
        if names.is_empty() {
            return Vec::new();
        }

        match strategy {
            SelectionStrategy::RoundRobin => {
                let start = self.cursor.peek(names.len());
                let scored = self.score(task_type, SelectionStrategy::Priority, retry_count, &names);
                names
                    .iter()
                    .cycle()
                    .skip(start)
                    .take(names.len())
                    .map(|name| {
                        let score = scored
                            .iter()
                            .find(|(n, _)| n == name)
                            .map(|(_, s)| *s)
                            .unwrap_or_default();
                        (name.clone(), score)
                    })
                    .collect()
            }
            _ => self.score(task_type, strategy, retry_count, &names),
        }
    }

    /// Candidates available by both the health window and the dispatcher.
    ///
    /// Falls back to all candidates when none qualifies, so selection always
    /// has something to try.
    fn eligible(&self, candidates: &[String]) -> Vec<String> {
        let available: Vec<String> = candidates
            .iter()
            .filter(|name| self.is_available(name))
            .cloned()
            .collect();

        if available.is_empty() {
            debug!("Every candidate is unavailable, considering all of them");
            candidates.to_vec()
        } else {
            available
        }
    }

    fn is_available(&self, name: &str) -> bool {
        let dispatcher_ok = self
            .registry
            .get(name)
            .and_then(|p| p.status())
            .map(|s| s.is_available)
            .unwrap_or(true);
        dispatcher_ok && self.health.is_available(name)
    }

    /// Score and order candidates; stable so equal scores keep registration order
    fn score(
        &self,
        task_type: &str,
        strategy: SelectionStrategy,
        retry_count: u32,
        candidates: &[String],
    ) -> Vec<(String, f64)> {
        let mut scored: Vec<(String, f64, f64)> = candidates
            .iter()
            .map(|name| {
                let health = self.health.get(name);
                let weight = self.priorities.weight(task_type, name);
                let score = provider_score(health.as_ref(), weight, retry_count);
                let load = health.map(|h| h.recent_requests).unwrap_or(0.0);
                (name.clone(), score, load)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        if strategy == SelectionStrategy::LoadBalanced {
            scored.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));
        }

        scored
            .into_iter()
            .map(|(name, score, _)| (name, score))
            .collect()
    }
}
