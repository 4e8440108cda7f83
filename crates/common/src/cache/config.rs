//! Cache sizing, eviction and default expiry

use std::time::Duration;

/// Which entry makes room when a bounded cache is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Least recently read or written
    #[default]
    LRU,
    /// Fewest reads
    LFU,
    /// Oldest insertion, reads ignored
    FIFO,
    /// Never evict; inserts past the bound still succeed
    None,
}

impl EvictionPolicy {
    /// Whether the policy needs insertion or access order recorded
    pub(crate) const fn tracks_order(self) -> bool {
        matches!(self, Self::LRU | Self::FIFO)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Entry limit, `None` for unbounded
    pub max_size: Option<usize>,

    /// Expiry for entries inserted without one, `None` for never
    pub default_ttl: Option<Duration>,

    pub eviction_policy: EvictionPolicy,

    /// Collect hit, miss, insert, eviction and expiration counters
    pub track_metrics: bool,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Unbounded, metered, every entry carries its own expiry
    ///
    /// ```
    /// use cachestorm_common::cache::{CacheConfig, EvictionPolicy};
    ///
    /// let config = CacheConfig::per_entry_ttl();
    /// assert!(config.default_ttl.is_none());
    /// assert_eq!(config.eviction_policy, EvictionPolicy::None);
    /// ```
    pub fn per_entry_ttl() -> Self {
        Self::builder().eviction_policy(EvictionPolicy::None).track_metrics(true).build()
    }

    /// Metered cache holding at most `max_size` entries
    pub fn bounded(max_size: usize, policy: EvictionPolicy) -> Self {
        Self::builder().max_size(max_size).eviction_policy(policy).track_metrics(true).build()
    }
}

#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = Some(ttl);
        self
    }

    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    pub fn build(self) -> CacheConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates the preset used by the warm-up memory store.
    ///
    /// Assertions:
    /// - No size limit and no default TTL.
    /// - Eviction disabled, metrics enabled.
    #[test]
    fn test_per_entry_ttl_preset() {
        let config = CacheConfig::per_entry_ttl();
        assert!(config.max_size.is_none());
        assert!(config.default_ttl.is_none());
        assert_eq!(config.eviction_policy, EvictionPolicy::None);
        assert!(config.track_metrics);
    }

    #[test]
    fn test_bounded_preset() {
        let config = CacheConfig::bounded(64, EvictionPolicy::LFU);
        assert_eq!(config.max_size, Some(64));
        assert_eq!(config.eviction_policy, EvictionPolicy::LFU);
        assert!(!config.eviction_policy.tracks_order());
        assert!(EvictionPolicy::FIFO.tracks_order());
    }

    #[test]
    fn test_builder_sets_default_ttl() {
        let config = CacheConfig::builder().default_ttl(Duration::from_secs(1800)).build();
        assert_eq!(config.default_ttl, Some(Duration::from_secs(1800)));
        assert_eq!(config.eviction_policy, EvictionPolicy::LRU);
        assert!(!config.track_metrics);
    }
}
