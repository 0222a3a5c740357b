//! Queue items, slot guards and counters used by the dispatcher

use crate::core::classifier::RawFailure;
use crate::core::providers::{Completion, CompletionRequest};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Reply channel for a queued request
pub(crate) type Reply = oneshot::Sender<Result<Completion, RawFailure>>;

/// A request waiting for a free slot
#[derive(Debug)]
pub(crate) struct QueueItem {
    pub request: CompletionRequest,
    pub reply: Reply,
    pub enqueued_at: Instant,
}

impl QueueItem {
    pub fn new(request: CompletionRequest, reply: Reply) -> Self {
        Self {
            request,
            reply,
            enqueued_at: Instant::now(),
        }
    }

    /// The caller stopped waiting for this item
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Mutable counters behind the dispatcher's status
#[derive(Debug, Default)]
pub(crate) struct DispatchStats {
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub average_latency_ms: f64,
    /// Set when the failure threshold trips, cleared by a success
    pub unavailable_since: Option<Instant>,
}

impl DispatchStats {
    pub fn record_success(&mut self, latency_ms: f64) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.consecutive_failures = 0;
        self.unavailable_since = None;
        let n = self.successful_requests as f64;
        self.average_latency_ms += (latency_ms - self.average_latency_ms) / n;
    }

    /// Returns true when this failure tripped the threshold
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        self.total_requests += 1;
        self.consecutive_failures += 1;
        if self.consecutive_failures >= threshold && self.unavailable_since.is_none() {
            self.unavailable_since = Some(Instant::now());
            return true;
        }
        false
    }
}

/// Model catalog fetched from the backend
#[derive(Debug, Clone)]
pub(crate) struct ModelCatalog {
    pub models: Vec<String>,
    pub refreshed_at: Instant,
}

impl ModelCatalog {
    pub fn new(models: Vec<String>) -> Self {
        Self {
            models,
            refreshed_at: Instant::now(),
        }
    }
}
