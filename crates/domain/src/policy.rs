//! Cache policy descriptors
//!
//! A policy names the cache slot a collection is written to and how long the
//! entry lives. It comes in two shapes:
//!
//! - [`InMemory`]: the declarative marker attached to a container type or a
//!   collection member. It is `const`-constructible so container models can
//!   be declared statically, and it is not validated.
//! - [`CachePolicy`]: the validated, immutable descriptor the populator works
//!   with. The only way to get one is through validation.
//!
//! ```
//! use std::time::Duration;
//!
//! use cachestorm_domain::policy::InMemory;
//!
//! const ORDERS: InMemory = InMemory::with_expiration_secs("orders-v1", 60);
//!
//! let policy = ORDERS.resolve().unwrap();
//! assert_eq!(policy.key(), "orders-v1");
//! assert_eq!(policy.expiration(), Duration::from_secs(60));
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::constants::DEFAULT_EXPIRATION;

/// Validation failures for a declared policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Cache policy key must not be empty")]
    EmptyKey,

    #[error("Cache policy '{key}' has a zero expiration")]
    ZeroExpiration { key: String },
}

/// Declarative cache marker for a container type or a collection member
///
/// Form A ([`InMemory::new`]) leaves the expiration to the default; form B
/// ([`InMemory::with_expiration`], [`InMemory::with_expiration_secs`]) sets it
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InMemory {
    key: &'static str,
    expiration: Option<Duration>,
}

impl InMemory {
    /// Marker with a key and the default expiration
    pub const fn new(key: &'static str) -> Self {
        Self { key, expiration: None }
    }

    /// Marker with an explicit expiration
    pub const fn with_expiration(key: &'static str, expiration: Duration) -> Self {
        Self { key, expiration: Some(expiration) }
    }

    /// Marker with an explicit expiration in seconds
    pub const fn with_expiration_secs(key: &'static str, seconds: u64) -> Self {
        Self::with_expiration(key, Duration::from_secs(seconds))
    }

    /// Declared key, unvalidated
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// Declared expiration, if any
    pub const fn expiration(&self) -> Option<Duration> {
        self.expiration
    }

    /// Validate into a [`CachePolicy`], defaulting to 30 minutes
    pub fn resolve(&self) -> Result<CachePolicy, PolicyError> {
        self.resolve_with_default(DEFAULT_EXPIRATION)
    }

    /// Validate into a [`CachePolicy`] using `default` when no expiration
    /// was declared
    pub fn resolve_with_default(&self, default: Duration) -> Result<CachePolicy, PolicyError> {
        CachePolicy::with_expiration(self.key, self.expiration.unwrap_or(default))
    }
}

/// Validated, immutable cache policy
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CachePolicy {
    key: String,
    #[serde(with = "duration_secs")]
    expiration: Duration,
}

impl CachePolicy {
    /// Policy with the default 30 minute expiration
    pub fn new(key: impl Into<String>) -> Result<Self, PolicyError> {
        Self::with_expiration(key, DEFAULT_EXPIRATION)
    }

    /// Policy with an explicit expiration
    pub fn with_expiration(
        key: impl Into<String>,
        expiration: Duration,
    ) -> Result<Self, PolicyError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(PolicyError::EmptyKey);
        }
        if expiration.is_zero() {
            return Err(PolicyError::ZeroExpiration { key });
        }
        Ok(Self { key, expiration })
    }

    /// Cache slot identifier
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time-to-live after insertion
    pub fn expiration(&self) -> Duration {
        self.expiration
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}s)", self.key, self.expiration.as_secs())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
