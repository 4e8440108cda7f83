use std::time::{Duration, Instant};

use cachestorm_core::{CacheStore, EntitySnapshot};
use moka::sync::Cache;
use moka::Expiry;
use tracing::trace;

/// Default upper bound on cached collections
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct TimedSnapshot {
    snapshot: EntitySnapshot,
    ttl: Duration,
}

/// Expires each entry after the TTL it was inserted with
struct PerEntryTtl;

impl Expiry<String, TimedSnapshot> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedSnapshot,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedSnapshot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache store backed by `moka::sync::Cache`
///
/// Clones share the same underlying cache.
#[derive(Clone)]
pub struct MokaCacheStore {
    cache: Cache<String, TimedSnapshot>,
}

impl MokaCacheStore {
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build(),
        }
    }

    /// Store bounded at [`DEFAULT_MAX_CAPACITY`] collections
    #[must_use]
    pub fn bounded_default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }

    /// Approximate entry count; pending maintenance is run first
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }
}

impl Default for MokaCacheStore {
    fn default() -> Self {
        Self::bounded_default()
    }
}

impl CacheStore for MokaCacheStore {
    fn get(&self, key: &str) -> Option<EntitySnapshot> {
        self.cache.get(key).map(|timed| timed.snapshot)
    }

    fn set(&self, key: &str, value: EntitySnapshot, ttl: Duration) {
        trace!(key, rows = value.len(), ttl_secs = ttl.as_secs(), "Caching snapshot");
        self.cache.insert(key.to_owned(), TimedSnapshot { snapshot: value, ttl });
    }

    fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use cachestorm_core::testing::fixtures::Product;

    use super::*;

    #[test]
    fn test_roundtrip_and_invalidate() {
        let store = MokaCacheStore::default();
        let products = EntitySnapshot::new(vec![Product::new(1, "tea")]);
        store.set("products", products, Duration::from_secs(60));

        let cached = store.get("products").unwrap();
        assert_eq!(cached.rows::<Product>().unwrap()[0].name, "tea");
        assert!(store.contains("products"));
        assert_eq!(store.entry_count(), 1);

        store.invalidate("products");
        assert!(!store.contains("products"));
    }

    /// Verifies the per-entry TTL is honoured.
    ///
    /// Assertions:
    /// - a 50ms entry disappears after sleeping past its TTL
    /// - a long-lived entry survives
    #[test]
    fn test_per_entry_expiry() {
        let store = MokaCacheStore::new(16);
        store.set("short", EntitySnapshot::new(Vec::<Product>::new()), Duration::from_millis(50));
        store.set("long", EntitySnapshot::new(Vec::<Product>::new()), Duration::from_secs(600));

        std::thread::sleep(Duration::from_millis(120));

        assert!(store.get("short").is_none());
        assert!(store.get("long").is_some());
    }
}
