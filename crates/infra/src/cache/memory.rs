use std::time::Duration;

use cachestorm_common::cache::{Cache, CacheConfig, CacheStats, EvictionPolicy};
use cachestorm_common::time::{Clock, SystemClock};
use cachestorm_core::{CacheStore, EntitySnapshot};
use tracing::trace;

/// Cache store over the in-process TTL [`Cache`]
#[derive(Clone)]
pub struct MemoryCacheStore<C: Clock = SystemClock> {
    cache: Cache<String, EntitySnapshot, C>,
}

impl MemoryCacheStore<SystemClock> {
    pub fn new() -> Self {
        Self { cache: Cache::new(CacheConfig::per_entry_ttl()) }
    }

    /// Store holding at most `max_entries` collections, least recently used
    /// evicted first
    pub fn bounded(max_entries: usize) -> Self {
        Self { cache: Cache::new(CacheConfig::bounded(max_entries, EvictionPolicy::LRU)) }
    }
}

impl Default for MemoryCacheStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> MemoryCacheStore<C> {
    /// Store driven by `clock`, for expiry tests
    pub fn with_clock(clock: C) -> Self {
        Self { cache: Cache::with_clock(CacheConfig::per_entry_ttl(), clock) }
    }

    /// Remaining time before `key` expires
    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        self.cache.time_to_live(&key.to_owned())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.remove(&key.to_owned());
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.cache.cleanup_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl<C> CacheStore for MemoryCacheStore<C>
where
    C: Clock + Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<EntitySnapshot> {
        self.cache.get(&key.to_owned())
    }

    fn set(&self, key: &str, value: EntitySnapshot, ttl: Duration) {
        trace!(key, rows = value.len(), ttl_secs = ttl.as_secs(), "Caching snapshot");
        self.cache.insert_with_ttl(key.to_owned(), value, ttl);
    }

    fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(&key.to_owned())
    }
}
