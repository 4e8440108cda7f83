//! # CacheStorm Infrastructure
//!
//! Adapters that plug the warm-up engine into a host.
//!
//! ## Modules
//! - [`di`]: service collection and provider with scoped lifetimes
//! - [`cache`]: cache store adapters (workspace TTL cache, `moka`)
//! - [`config`]: warm-up configuration from environment and files
//! - [`observability`]: tracing subscriber setup

pub mod cache;
pub mod config;
pub mod di;
pub mod errors;
pub mod observability;

pub use cache::{MemoryCacheStore, MokaCacheStore};
pub use di::{Lifetime, ServiceCollection, ServiceProvider, ServiceScope};
pub use errors::{InfraError, InfraResult};
pub use observability::{init_tracing, LogFormat};
