//! Cache storage, expiry and eviction
//!
//! A generic, thread-safe cache with configurable eviction (LRU, LFU, FIFO,
//! None). Every entry records its own expiry instant, taken either
//! from the TTL passed to [`Cache::insert_with_ttl`] or from the configured
//! default.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::{CacheConfig, EvictionPolicy};
use super::stats::{CacheStats, Counter, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Entry stored in the cache with metadata for eviction policies
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
    access_count: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

#[derive(Debug)]
struct CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: HashMap<K, CacheEntry<V>>,
    /// Tracks order for LRU/FIFO eviction
    access_order: Vec<K>,
}

impl<K, V> CacheStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self { entries: HashMap::new(), access_order: Vec::new() }
    }

    fn forget(&mut self, key: &K) -> Option<CacheEntry<V>> {
        self.access_order.retain(|k| k != key);
        self.entries.remove(key)
    }
}

/// Generic thread-safe cache with per-entry TTL
///
/// Clones share the same storage and counters.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use cachestorm_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, i32> = Cache::new(CacheConfig::per_entry_ttl());
/// cache.insert_with_ttl("key".to_string(), 42, Duration::from_secs(60));
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage::new())),
            config,
            metrics: MetricsCollector::new(),
            clock,
        }
    }

    /// Insert a value using the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_entry(key, value, self.config.default_ttl);
    }

    /// Insert a value that expires `ttl` after now
    ///
    /// Replaces any existing entry for the key, including its expiry.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.insert_entry(key, value, Some(ttl));
    }

    fn insert_entry(&self, key: K, value: V, ttl: Option<Duration>) {
        let mut storage = self.storage.write();

        if let Some(max_size) = self.config.max_size {
            if storage.entries.len() >= max_size && !storage.entries.contains_key(&key) {
                self.evict_one(&mut storage);
            }
        }

        let entry = CacheEntry {
            value,
            expires_at: ttl.and_then(|ttl| self.clock.deadline(ttl)),
            access_count: 0,
        };

        storage.entries.insert(key.clone(), entry);

        if self.config.eviction_policy.tracks_order() {
            storage.access_order.retain(|k| k != &key);
            storage.access_order.push(key);
        }

        self.count(Counter::Insert);
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or its entry has expired.
    /// Expired entries are dropped on the way out.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write();
        let now = self.clock.now();

        let expired = match storage.entries.get(key) {
            None => {
                self.count(Counter::Miss);
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            storage.forget(key);
            self.count(Counter::Miss);
            self.count(Counter::Expiration);
            return None;
        }

        let value = storage.entries.get_mut(key).map(|entry| {
            entry.access_count += 1;
            entry.value.clone()
        });

        if self.config.eviction_policy == EvictionPolicy::LRU {
            storage.access_order.retain(|k| k != key);
            storage.access_order.push(key.clone());
        }

        self.count(Counter::Hit);

        value
    }

    /// Whether a live entry exists for the key
    ///
    /// Does not count as an access for eviction or metrics.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.storage.read().entries.get(key).is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remaining lifetime of a live entry
    ///
    /// `None` when the key is absent or expired; `Some(Duration::MAX)` for
    /// entries that never expire.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        let now = self.clock.now();
        let storage = self.storage.read();
        let entry = storage.entries.get(key).filter(|entry| !entry.is_expired(now))?;
        Some(entry.expires_at.map_or(Duration::MAX, |deadline| deadline.duration_since(now)))
    }

    /// Drop the entry for `key`, returning its value if it was still held
    pub fn remove(&self, key: &K) -> Option<V> {
        self.storage.write().forget(key).map(|e| e.value)
    }

    /// Get the current number of entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        let expired: Vec<K> = storage
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            storage.forget(key);
            self.count(Counter::Expiration);
        }

        expired.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len(), self.config.max_size)
    }

    fn count(&self, counter: Counter) {
        if self.config.track_metrics {
            self.metrics.record(counter);
        }
    }

    fn evict_one(&self, storage: &mut CacheStorage<K, V>) {
        let key_to_evict = match self.config.eviction_policy {
            EvictionPolicy::LRU | EvictionPolicy::FIFO => storage.access_order.first().cloned(),
            EvictionPolicy::LFU => storage
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.access_count)
                .map(|(k, _)| k.clone()),
            EvictionPolicy::None => None,
        };

        if let Some(key) = key_to_evict {
            storage.forget(&key);
            self.count(Counter::Eviction);
        }
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
