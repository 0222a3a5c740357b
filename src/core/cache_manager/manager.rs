//! Response cache implementation
//!
//! Entries live in an `LruCache` whose recency order is the write order:
//! lookups only `peek`, so the least recently used entry is always the
//! oldest write. The lock is held for the map operation alone and never
//! across an `.await`.

use super::types::{AtomicCacheStats, CacheEntry, CacheKey, CacheStats};
use crate::config::CacheConfig;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::debug;

/// In-memory TTL cache with oldest-write eviction
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<CacheKey, CacheEntry<V>>>,
    ttl: Duration,
    max_size: usize,
    enabled: bool,
    stats: AtomicCacheStats,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a new cache
    pub fn new(config: &CacheConfig) -> Self {
        // A zero max_size keeps the cache empty; the map itself needs a non-zero capacity
        let capacity = NonZeroUsize::new(config.max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl_duration(),
            max_size: config.max_size,
            enabled: config.enabled,
            stats: AtomicCacheStats::default(),
        }
    }

    /// Whether lookups and writes are performed at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up a value, dropping it if its TTL has passed
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let mut entries = self.entries.lock();
        let expired = entries.peek(key).map(CacheEntry::is_expired);
        match expired {
            Some(false) => {
                let entry = entries.peek(key)?;
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, age_ms = entry.age().as_millis() as u64, "cache hit");
                Some(entry.value.clone())
            }
            Some(true) => {
                entries.pop(key);
                self.stats.expirations.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache entry expired");
                None
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value, evicting the oldest write when a new key would overflow
    pub fn put(&self, key: CacheKey, value: V) {
        if !self.enabled || self.max_size == 0 {
            return;
        }

        let entry = CacheEntry::new(value, self.ttl);
        let mut entries = self.entries.lock();
        if !entries.contains(&key) && entries.len() >= self.max_size {
            if let Some((oldest, _)) = entries.pop_lru() {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(evicted = %oldest, "cache full, evicted oldest entry");
            }
        }
        entries.put(key, entry);
    }

    /// Remove a single key
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.entries.lock().pop(key).map(|e| e.value)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.stats.reset();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters plus the current entry count
    pub fn stats(&self) -> CacheStats {
        let entries = self.len();
        self.stats.snapshot(entries)
    }
}
