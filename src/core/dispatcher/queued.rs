//! Bounded-concurrency wrapper around a provider

use super::types::{DispatchStats, ModelCatalog, QueueItem};
use crate::config::DispatcherConfig;
use crate::core::classifier::{ErrorKind, RawFailure, classify};
use crate::core::providers::{Completion, CompletionRequest, Provider, ProviderStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// Whether a failed attempt may be retried inside the dispatcher.
///
/// Once more than half the slots are busy only network errors are retried,
/// and only while the provider has fewer than `saturated_failure_limit`
/// consecutive failures.
pub fn retry_allowed(
    config: &DispatcherConfig,
    kind: ErrorKind,
    consecutive_failures: u32,
    active: usize,
) -> bool {
    if !kind.is_retryable() {
        return false;
    }
    if active > config.max_concurrent / 2 {
        return kind == ErrorKind::NetworkError
            && consecutive_failures < config.saturated_failure_limit;
    }
    true
}

/// Provider wrapper that caps in-flight calls and queues the rest.
///
/// Cloning is cheap; clones share the same queue and counters.
pub struct QueuedProvider<P: Provider + 'static> {
    shared: Arc<Shared<P>>,
}

impl<P: Provider + 'static> Clone for QueuedProvider<P> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<P: Provider + 'static> std::fmt::Debug for QueuedProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedProvider")
            .field("provider", &self.shared.provider.name())
            .field("status", &self.status())
            .finish()
    }
}

struct Shared<P: Provider + 'static> {
    provider: P,
    config: DispatcherConfig,
    active: AtomicUsize,
    queue: Mutex<VecDeque<QueueItem>>,
    draining: AtomicBool,
    stats: Mutex<DispatchStats>,
    catalog: Mutex<Option<ModelCatalog>>,
}

/// Holds one concurrency slot; releasing it kicks the drain
struct SlotGuard<P: Provider + 'static> {
    shared: Arc<Shared<P>>,
}

impl<P: Provider + 'static> Drop for SlotGuard<P> {
    fn drop(&mut self) {
        self.shared.active.fetch_sub(1, Ordering::AcqRel);
        Shared::schedule_drain(&self.shared);
    }
}

impl<P: Provider + 'static> QueuedProvider<P> {
    pub fn new(provider: P, config: DispatcherConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                provider,
                config,
                active: AtomicUsize::new(0),
                queue: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                stats: Mutex::new(DispatchStats::default()),
                catalog: Mutex::new(None),
            }),
        }
    }

    /// The wrapped backend
    pub fn inner(&self) -> &P {
        &self.shared.provider
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.shared.config
    }

    /// Run a request now if a slot is free, otherwise wait in the queue.
    ///
    /// Dropping the returned future abandons the request: a queued item is
    /// skipped at drain time and an in-flight call is cancelled.
    pub async fn submit(&self, request: CompletionRequest) -> Result<Completion, RawFailure> {
        let shared = &self.shared;
        if !request.bypass_availability_check && !shared.check_availability().await {
            return Err(RawFailure::unavailable(
                shared.provider.name(),
                "provider is cooling down after repeated failures",
            ));
        }

        let request = shared.prepare(request);
        if let Some(slot) = shared.try_acquire() {
            return shared.execute(request, slot).await;
        }

        let (tx, rx) = oneshot::channel();
        let depth = {
            let mut queue = shared.queue.lock();
            queue.push_back(QueueItem::new(request, tx));
            queue.len()
        };
        debug!(
            provider = shared.provider.name(),
            queue_length = depth,
            "all slots busy, request queued"
        );
        // A slot may have been released between the failed acquire and the push
        Shared::schedule_drain(shared);

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(RawFailure::unavailable(
                shared.provider.name(),
                "dispatcher dropped the queued request",
            )),
        }
    }

    /// Cached model catalog, refreshed from the backend once stale
    pub async fn models(&self) -> Result<Vec<String>, RawFailure> {
        if let Some(catalog) = self.shared.fresh_catalog() {
            return Ok(catalog.models);
        }
        let models = self.shared.provider.list_models().await?;
        *self.shared.catalog.lock() = Some(ModelCatalog::new(models.clone()));
        Ok(models)
    }

    pub fn status(&self) -> ProviderStatus {
        self.shared.status()
    }

    pub fn queue_length(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn active_requests(&self) -> usize {
        self.shared.active.load(Ordering::Acquire)
    }
}

impl<P: Provider + 'static> Shared<P> {
    fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard<P>> {
        let max = self.config.max_concurrent;
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| SlotGuard {
                shared: self.clone(),
            })
    }

    fn has_capacity(&self) -> bool {
        self.active.load(Ordering::Acquire) < self.config.max_concurrent
    }

    fn is_probe(&self, request: &CompletionRequest) -> bool {
        let config = &self.config;
        request.prompt.chars().count() < config.probe_prompt_chars
            || request.prompt.contains(&config.probe_marker)
            || request
                .options
                .max_tokens
                .is_some_and(|t| t <= config.probe_token_threshold)
    }

    /// Apply the probe fast path and settle the per-call deadline
    fn prepare(&self, mut request: CompletionRequest) -> CompletionRequest {
        let config = &self.config;
        let limit = if self.is_probe(&request) {
            request.options.max_tokens = Some(config.probe_max_tokens);
            if let Some(model) = self.fast_model() {
                debug!(
                    provider = self.provider.name(),
                    from = %request.model,
                    to = %model,
                    "routing probe request to fast model"
                );
                request.model = model;
            }
            config.probe_timeout()
        } else {
            config.normal_timeout()
        };
        let deadline = request.options.timeout.map_or(limit, |t| t.min(limit));
        request.options.timeout = Some(deadline);
        request
    }

    fn fast_model(&self) -> Option<String> {
        if self.config.fast_models.is_empty() {
            return None;
        }
        let catalog = self.catalog.lock();
        let catalog = catalog.as_ref()?;
        self.config
            .fast_models
            .iter()
            .find(|m| catalog.models.contains(m))
            .cloned()
    }

    fn fresh_catalog(&self) -> Option<ModelCatalog> {
        self.catalog
            .lock()
            .as_ref()
            .filter(|c| c.refreshed_at.elapsed() < self.config.catalog_ttl())
            .cloned()
    }

    async fn execute(
        &self,
        request: CompletionRequest,
        _slot: SlotGuard<P>,
    ) -> Result<Completion, RawFailure> {
        let name = self.provider.name();
        let deadline = request
            .options
            .timeout
            .unwrap_or_else(|| self.config.normal_timeout());
        let mut retries = 0;

        loop {
            let started = Instant::now();
            let outcome = match timeout(deadline, self.provider.invoke(&request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(RawFailure::timeout(deadline)),
            };

            let failure = match outcome {
                Ok(mut completion) => {
                    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                    self.stats.lock().record_success(latency_ms);
                    completion.retries = retries;
                    return Ok(completion);
                }
                Err(failure) => failure,
            };

            let kind = classify(&failure);
            let (consecutive, tripped) = {
                let mut stats = self.stats.lock();
                let tripped = stats.record_failure(self.config.failure_threshold);
                (stats.consecutive_failures, tripped)
            };
            if tripped {
                warn!(
                    provider = name,
                    consecutive_failures = consecutive,
                    cooldown_secs = self.config.cooldown_secs,
                    "provider marked unavailable"
                );
            }

            let active = self.active.load(Ordering::Acquire);
            if tripped
                || retries >= self.config.max_retries
                || !retry_allowed(&self.config, kind, consecutive, active)
            {
                return Err(failure);
            }

            let delay = self.config.retry_delay(retries);
            warn!(
                provider = name,
                kind = %kind,
                retry = retries + 1,
                delay_ms = delay.as_millis() as u64,
                "retrying failed call"
            );
            sleep(delay).await;
            retries += 1;
        }
    }

    async fn check_availability(&self) -> bool {
        let since = self.stats.lock().unavailable_since;
        match since {
            None => true,
            Some(at) if at.elapsed() < self.config.cooldown() => false,
            Some(_) => self.probe_models().await,
        }
    }

    async fn probe_models(&self) -> bool {
        let name = self.provider.name();
        let probe = timeout(
            self.config.availability_probe_timeout(),
            self.provider.list_models(),
        )
        .await;

        match probe {
            Ok(Ok(models)) => {
                {
                    let mut stats = self.stats.lock();
                    stats.consecutive_failures = 0;
                    stats.unavailable_since = None;
                }
                *self.catalog.lock() = Some(ModelCatalog::new(models));
                info!(provider = name, "provider available again");
                true
            }
            Ok(Err(failure)) => {
                self.stats.lock().unavailable_since = Some(Instant::now());
                warn!(provider = name, error = %failure, "availability probe failed");
                false
            }
            Err(_) => {
                self.stats.lock().unavailable_since = Some(Instant::now());
                warn!(provider = name, "availability probe timed out");
                false
            }
        }
    }

    fn status(&self) -> ProviderStatus {
        let stats = self.stats.lock();
        ProviderStatus {
            is_available: stats
                .unavailable_since
                .is_none_or(|at| at.elapsed() >= self.config.cooldown()),
            consecutive_failures: stats.consecutive_failures,
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            average_latency_ms: stats.average_latency_ms,
            queue_length: self.queue.lock().len(),
            active_requests: self.active.load(Ordering::Acquire),
        }
    }

    fn schedule_drain(shared: &Arc<Self>) {
        if shared.queue.lock().is_empty() {
            return;
        }
        if shared.draining.swap(true, Ordering::AcqRel) {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let shared = shared.clone();
                handle.spawn(async move { shared.drain().await });
            }
            Err(_) => shared.draining.store(false, Ordering::Release),
        }
    }

    fn pop_live(&self) -> Option<QueueItem> {
        let mut queue = self.queue.lock();
        while let Some(item) = queue.pop_front() {
            if item.is_abandoned() {
                debug!(provider = self.provider.name(), "skipping abandoned request");
                continue;
            }
            return Some(item);
        }
        None
    }

    async fn drain(self: Arc<Self>) {
        loop {
            let mut dispatched = 0;
            while dispatched < self.config.drain_batch_size {
                let Some(slot) = self.try_acquire() else {
                    break;
                };
                let Some(item) = self.pop_live() else {
                    drop(slot);
                    break;
                };

                debug!(
                    provider = self.provider.name(),
                    waited_ms = item.enqueued_at.elapsed().as_millis() as u64,
                    "dispatching queued request"
                );
                let shared = self.clone();
                tokio::spawn(async move {
                    let QueueItem {
                        request, mut reply, ..
                    } = item;
                    // Dropping the execute future releases the slot once the caller is gone
                    tokio::select! {
                        result = shared.execute(request, slot) => {
                            let _ = reply.send(result);
                        }
                        _ = reply.closed() => {
                            debug!(provider = shared.provider.name(), "caller gone, cancelled queued request");
                        }
                    }
                });
                dispatched += 1;

                if dispatched < self.config.drain_batch_size && !self.queue.lock().is_empty() {
                    sleep(self.config.dispatch_pacing()).await;
                }
            }

            let pending = !self.queue.lock().is_empty();
            if pending && self.has_capacity() {
                sleep(self.config.reschedule_delay()).await;
                continue;
            }

            self.draining.store(false, Ordering::Release);
            // Re-check after clearing the flag so a release racing with it is not lost
            let pending = !self.queue.lock().is_empty();
            if pending && self.has_capacity() && !self.draining.swap(true, Ordering::AcqRel) {
                continue;
            }
            return;
        }
    }
}

#[async_trait]
impl<P: Provider + 'static> Provider for QueuedProvider<P> {
    fn name(&self) -> &str {
        self.shared.provider.name()
    }

    async fn invoke(&self, request: &CompletionRequest) -> Result<Completion, RawFailure> {
        self.submit(request.clone()).await
    }

    async fn is_available(&self) -> bool {
        self.shared.check_availability().await
    }

    async fn list_models(&self) -> Result<Vec<String>, RawFailure> {
        self.models().await
    }

    fn status(&self) -> Option<ProviderStatus> {
        Some(self.shared.status())
    }
}
