//! Port interfaces the warm-up engine is driven through
//!
//! The engine never constructs containers, stores or sinks itself. Hosts
//! supply them through these traits (see `cachestorm-infra` for the default
//! adapters and [`crate::testing`] for in-memory fakes).

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use cachestorm_common::error::{ErrorClassification, ErrorSeverity};
use cachestorm_domain::TypeKey;
use tracing::{error, info, warn};

use crate::errors::{DataError, PopulateError, ResolveError};
use crate::snapshot::EntitySnapshot;

/// A row type exposed by a data context
pub trait Entity: Clone + Send + Sync + 'static {
    /// Discriminator passed to [`DataContext::set`]
    fn qualified_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Lazily evaluated, fallible sequence of rows
pub type EntityQuery<'a, E> = Box<dyn Iterator<Item = Result<E, DataError>> + 'a>;

/// Unit-of-work over a data source (an ORM context)
pub trait DataContext: Send + Sync + 'static {
    /// Open the collection of `E` registered under `name`
    fn set<E: Entity>(&self, name: &str) -> Result<EntityQuery<'_, E>, DataError>;
}

/// Shared keyed store the engine writes snapshots into
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<EntitySnapshot>;

    /// Insert `value` under `key`, expiring `ttl` after insertion
    fn set(&self, key: &str, value: EntitySnapshot, ttl: Duration);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// A resolved service instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Bounded lifetime for scoped service instances
///
/// Instances resolved from a scope are released when the scope is dropped.
pub trait ContainerScope {
    fn resolve(&self, service: TypeKey) -> Result<Instance, ResolveError>;
}

/// Creates scopes that container instances are resolved from
pub trait ContainerFactory: Send + Sync {
    fn create_scope(&self) -> Result<Box<dyn ContainerScope + '_>, ResolveError>;
}

/// A built service provider
pub trait ServiceResolver: ContainerFactory {
    /// The registered cache store, if any
    fn cache_store(&self) -> Option<Arc<dyn CacheStore>>;
}

/// A service collection still being assembled
pub trait ServiceRegistrations {
    /// Registered service types, in registration order
    fn registered_types(&self) -> Vec<TypeKey>;

    /// Build a temporary resolver over the current registrations
    fn build_resolver(&self) -> Result<Box<dyn ServiceResolver>, ResolveError>;
}

/// Receives the single failure report of a resolution-time pass
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, error: &PopulateError, message: &str);
}

/// Sink that logs through `tracing` at a level matching the error severity
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, error: &PopulateError, message: &str) {
        match error.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                error!(error = %error, retryable = error.is_retryable(), "{message}")
            }
            ErrorSeverity::Warning => {
                warn!(error = %error, retryable = error.is_retryable(), "{message}")
            }
            ErrorSeverity::Info => info!(error = %error, "{message}"),
        }
    }
}
