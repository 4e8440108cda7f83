//! [`CacheStore`](cachestorm_core::CacheStore) adapters
//!
//! - [`MemoryCacheStore`]: the workspace TTL cache, with hit/miss statistics
//! - [`MokaCacheStore`]: `moka` with a per-entry expiry policy and a bounded
//!   capacity

mod memory;
mod moka;

pub use memory::MemoryCacheStore;
pub use self::moka::{MokaCacheStore, DEFAULT_MAX_CAPACITY};
