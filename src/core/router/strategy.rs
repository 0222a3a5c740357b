//! Selection strategy definitions

use crate::utils::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How candidates are ranked for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Task priority weights modulated by health
    #[default]
    Priority,
    /// Same scoring, the fastest/healthiest path
    Performance,
    /// Same scoring, reserved for a cost term
    CostOptimized,
    /// Scored, then least recently loaded first
    LoadBalanced,
    /// Shared cursor over the eligible providers, health ignored
    RoundRobin,
    /// Priority scoring with the failing provider excluded
    Fallback,
}

impl SelectionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Performance => "performance",
            Self::CostOptimized => "cost_optimized",
            Self::LoadBalanced => "load_balanced",
            Self::RoundRobin => "round_robin",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionStrategy {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "priority" => Ok(Self::Priority),
            "performance" => Ok(Self::Performance),
            "cost_optimized" | "cost" => Ok(Self::CostOptimized),
            "load_balanced" => Ok(Self::LoadBalanced),
            "round_robin" => Ok(Self::RoundRobin),
            "fallback" => Ok(Self::Fallback),
            other => Err(GatewayError::validation(format!(
                "Unknown selection strategy: {}",
                other
            ))),
        }
    }
}

/// Shared round-robin position
#[derive(Debug, Default)]
pub struct RoundRobinCursor {
    position: AtomicUsize,
}

impl RoundRobinCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next index in `0..len`; `len` must be non-zero
    pub fn advance(&self, len: usize) -> usize {
        self.position.fetch_add(1, Ordering::Relaxed) % len
    }

    /// Index the next `advance` would return, without moving
    pub fn peek(&self, len: usize) -> usize {
        self.position.load(Ordering::Relaxed) % len
    }
}
