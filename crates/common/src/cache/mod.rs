//! In-process cache with per-entry expiration
//!
//! Backs the memory cache store: keys are cache keys from policy markers and
//! every insert carries the expiration of the marker that produced it.
//! Clones share storage and counters. Expired entries are dropped lazily on
//! read or in bulk through [`Cache::cleanup_expired`]. Bounded caches evict by
//! [`EvictionPolicy`].
//!
//! ```
//! use std::time::Duration;
//!
//! use cachestorm_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<String, Vec<u32>> = Cache::new(CacheConfig::per_entry_ttl());
//! cache.insert_with_ttl("orders-v1".to_string(), vec![1, 2, 3], Duration::from_secs(60));
//!
//! assert!(cache.contains_key(&"orders-v1".to_string()));
//! assert_eq!(cache.stats().inserts, 1);
//! ```

mod config;
mod core;
mod stats;

pub use core::Cache;

pub use config::{CacheConfig, CacheConfigBuilder, EvictionPolicy};
pub use stats::CacheStats;
