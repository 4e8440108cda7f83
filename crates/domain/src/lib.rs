//! # CacheStorm Domain
//!
//! Data types shared by every CacheStorm crate.
//!
//! This crate contains:
//! - Cache policy descriptors ([`InMemory`] markers and validated
//!   [`CachePolicy`] values)
//! - Type identity for containers and entities ([`TypeKey`])
//! - Warm-up configuration ([`WarmupConfig`])
//!
//! ## Architecture
//! - No dependencies on other CacheStorm crates
//! - Pure data and validation, no I/O

pub mod config;
pub mod constants;
pub mod macros;
pub mod policy;
pub mod types;

pub use config::{FailurePolicy, InvalidConfig, WarmupConfig};
pub use constants::{DEFAULT_EXPIRATION, DEFAULT_EXPIRATION_SECS};
pub use policy::{CachePolicy, InMemory, PolicyError};
pub use types::TypeKey;
