//! Warm-up configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_EXPIRATION_SECS;
use crate::impl_config_enum_conversions;

/// How a populate pass reacts to a failing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and keep processing the remaining entries
    #[default]
    ContinueOnFailure,
    /// Stop the pass at the first failing entry
    AbortOnFirstFailure,
}

impl_config_enum_conversions!(FailurePolicy {
    ContinueOnFailure => "continue_on_failure",
    AbortOnFirstFailure => "abort_on_first_failure",
});

/// Rejected configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid warm-up configuration: {0}")]
pub struct InvalidConfig(pub String);

/// Settings shared by both warm-up entry points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// When false both entry points return without touching the cache
    pub enabled: bool,
    pub failure_policy: FailurePolicy,
    /// Serialize check-then-set per cache key
    pub per_key_lock: bool,
    /// Expiration for markers declared without one
    pub default_expiration_secs: u64,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_policy: FailurePolicy::default(),
            per_key_lock: false,
            default_expiration_secs: DEFAULT_EXPIRATION_SECS,
        }
    }
}

impl WarmupConfig {
    /// Default expiration as a [`Duration`]
    pub fn default_expiration(&self) -> Duration {
        Duration::from_secs(self.default_expiration_secs)
    }

    /// Builder-style override of the failure policy
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Builder-style toggle for per-key locking
    pub fn with_per_key_lock(mut self, enabled: bool) -> Self {
        self.per_key_lock = enabled;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`InvalidConfig`] when `default_expiration_secs` is zero.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.default_expiration_secs == 0 {
            return Err(InvalidConfig("default_expiration_secs must be greater than zero".into()));
        }
        Ok(())
    }
}
