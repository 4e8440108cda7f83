//! Hit, miss and expiry counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Point-in-time view of a cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries held, expired ones included until swept
    pub size: usize,
    pub max_size: Option<usize>,
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    pub inserts: u64,
    /// Entries removed to stay under `max_size`
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    /// Share of reads served from the cache, 0.0 before the first read
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Counter {
    Hit,
    Miss,
    Insert,
    Eviction,
    Expiration,
}

/// Counters shared by every clone of a cache
#[derive(Debug, Clone, Default)]
pub(crate) struct MetricsCollector {
    counters: Arc<[AtomicU64; 5]>,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, counter: Counter) {
        self.counters[counter as usize].fetch_add(1, Ordering::Relaxed);
    }

    fn load(&self, counter: Counter) -> u64 {
        self.counters[counter as usize].load(Ordering::Relaxed)
    }

    pub(crate) fn snapshot(&self, size: usize, max_size: Option<usize>) -> CacheStats {
        CacheStats {
            size,
            max_size,
            hits: self.load(Counter::Hit),
            misses: self.load(Counter::Miss),
            inserts: self.load(Counter::Insert),
            evictions: self.load(Counter::Eviction),
            expirations: self.load(Counter::Expiration),
        }
    }
}
