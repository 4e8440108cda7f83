//! In-memory fakes for the port traits
//!
//! Available to this crate's tests and, behind the `test-utils` feature, to
//! downstream crates and benches.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cachestorm_domain::TypeKey;
use parking_lot::Mutex;

use crate::errors::{DataError, PopulateError, ResolveError};
use crate::ports::{
    CacheStore, ContainerFactory, ContainerScope, DataContext, DiagnosticSink, Entity,
    EntityQuery, Instance, ServiceRegistrations, ServiceResolver,
};
use crate::snapshot::EntitySnapshot;

/// Shared counter handle
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn incr(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn decr(&self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
struct FakeCollection {
    rows: Arc<dyn Any + Send + Sync>,
    fail_after: Option<usize>,
}

/// Data context over in-memory vectors, keyed by entity qualified name
#[derive(Clone, Default)]
pub struct FakeDataContext {
    collections: HashMap<&'static str, FakeCollection>,
    reads: Counter,
}

impl FakeDataContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `rows` as the collection of `E`
    pub fn with_rows<E: Entity>(mut self, rows: Vec<E>) -> Self {
        self.collections
            .insert(E::qualified_name(), FakeCollection { rows: Arc::new(rows), fail_after: None });
        self
    }

    /// Expose `rows`, but fail enumeration after `fail_after` rows
    pub fn with_failing_enumeration<E: Entity>(mut self, rows: Vec<E>, fail_after: usize) -> Self {
        self.collections.insert(
            E::qualified_name(),
            FakeCollection { rows: Arc::new(rows), fail_after: Some(fail_after) },
        );
        self
    }

    /// Number of collection accessor calls so far
    pub fn reads(&self) -> Counter {
        self.reads.clone()
    }
}

impl DataContext for FakeDataContext {
    fn set<E: Entity>(&self, name: &str) -> Result<EntityQuery<'_, E>, DataError> {
        self.reads.incr();
        let collection = self
            .collections
            .get(name)
            .ok_or_else(|| DataError::new(format!("no collection named '{name}'")))?;
        let rows = collection
            .rows
            .downcast_ref::<Vec<E>>()
            .ok_or_else(|| DataError::new(format!("collection '{name}' holds another type")))?;

        let iter = rows.iter().cloned().map(Ok);
        let query: EntityQuery<'_, E> = match collection.fail_after {
            Some(n) => Box::new(
                iter.take(n).chain(std::iter::once(Err(DataError::new("connection reset")))),
            ),
            None => Box::new(iter),
        };
        Ok(query)
    }
}

/// Cache store that records TTLs and write counts
#[derive(Default)]
pub struct RecordingCacheStore {
    entries: Mutex<HashMap<String, (EntitySnapshot, Duration)>>,
    sets: Counter,
}

impl RecordingCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, key: &str) -> Option<EntitySnapshot> {
        self.entries.lock().get(key).map(|(snapshot, _)| snapshot.clone())
    }

    /// TTL the key was last stored with
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn set_calls(&self) -> usize {
        self.sets.get()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl CacheStore for RecordingCacheStore {
    fn get(&self, key: &str) -> Option<EntitySnapshot> {
        self.snapshot(key)
    }

    fn set(&self, key: &str, value: EntitySnapshot, ttl: Duration) {
        self.sets.incr();
        self.entries.lock().insert(key.to_owned(), (value, ttl));
    }
}

/// Resolver over a fixed table of instances
#[derive(Clone, Default)]
pub struct StaticResolver {
    services: HashMap<TypeKey, Result<Instance, String>>,
    cache: Option<Arc<dyn CacheStore>>,
    open: Counter,
    created: Counter,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance<T: Send + Sync + 'static>(mut self, instance: T) -> Self {
        self.services.insert(TypeKey::of::<T>(), Ok(Arc::new(instance)));
        self
    }

    /// Make resolving `T` fail with `message`
    pub fn with_failing<T: 'static>(mut self, message: &str) -> Self {
        self.services.insert(TypeKey::of::<T>(), Err(message.to_owned()));
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Scopes created and not yet dropped
    pub fn open_scopes(&self) -> usize {
        self.open.get()
    }

    pub fn scopes_created(&self) -> usize {
        self.created.get()
    }
}

struct StaticScope<'a> {
    resolver: &'a StaticResolver,
}

impl ContainerScope for StaticScope<'_> {
    fn resolve(&self, service: TypeKey) -> Result<Instance, ResolveError> {
        match self.resolver.services.get(&service) {
            Some(Ok(instance)) => Ok(Arc::clone(instance)),
            Some(Err(message)) => Err(ResolveError::Construction {
                type_name: service.name(),
                message: message.clone(),
            }),
            None => Err(ResolveError::NotRegistered { type_name: service.name() }),
        }
    }
}

impl Drop for StaticScope<'_> {
    fn drop(&mut self) {
        self.resolver.open.decr();
    }
}

impl ContainerFactory for StaticResolver {
    fn create_scope(&self) -> Result<Box<dyn ContainerScope + '_>, ResolveError> {
        self.created.incr();
        self.open.incr();
        Ok(Box::new(StaticScope { resolver: self }))
    }
}

impl ServiceResolver for StaticResolver {
    fn cache_store(&self) -> Option<Arc<dyn CacheStore>> {
        self.cache.clone()
    }
}

/// Registration list that builds a [`StaticResolver`]
#[derive(Clone, Default)]
pub struct StaticRegistrations {
    types: Vec<TypeKey>,
    resolver: Option<StaticResolver>,
    fail_build: bool,
}

impl StaticRegistrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, ty: TypeKey) -> Self {
        self.types.push(ty);
        self
    }

    /// Resolver handed out by `build_resolver`
    pub fn with_resolver(mut self, resolver: StaticResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Make `build_resolver` fail
    pub fn failing_build(mut self) -> Self {
        self.fail_build = true;
        self
    }
}

impl ServiceRegistrations for StaticRegistrations {
    fn registered_types(&self) -> Vec<TypeKey> {
        self.types.clone()
    }

    fn build_resolver(&self) -> Result<Box<dyn ServiceResolver>, ResolveError> {
        if self.fail_build {
            return Err(ResolveError::Construction {
                type_name: "StaticResolver",
                message: "build failed".into(),
            });
        }
        Ok(Box::new(self.resolver.clone().unwrap_or_default()))
    }
}

/// One report received by a [`CollectingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub error: PopulateError,
    pub message: String,
}

/// Diagnostic sink that keeps every report
#[derive(Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<SinkReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<SinkReport> {
        self.reports.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, error: &PopulateError, message: &str) {
        self.reports.lock().push(SinkReport { error: error.clone(), message: message.to_owned() });
    }
}

/// Example entities and containers
pub mod fixtures {
    use cachestorm_domain::InMemory;

    use super::FakeDataContext;
    use crate::errors::DataError;
    use crate::ports::{DataContext, Entity, EntityQuery};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Product {
        pub id: u32,
        pub name: String,
    }

    impl Product {
        pub fn new(id: u32, name: &str) -> Self {
            Self { id, name: name.to_owned() }
        }
    }

    impl Entity for Product {}

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Order {
        pub id: u32,
        pub product_id: u32,
    }

    impl Order {
        pub fn new(id: u32, product_id: u32) -> Self {
            Self { id, product_id }
        }
    }

    impl Entity for Order {}

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Item {
        pub id: u32,
    }

    impl Item {
        pub fn new(id: u32) -> Self {
            Self { id }
        }
    }

    impl Entity for Item {}

    /// Container whose `orders` member is cached as `orders-v1` for 60s
    #[derive(Clone, Default)]
    pub struct Store(FakeDataContext);

    impl Store {
        pub fn new(context: FakeDataContext) -> Self {
            Self(context)
        }
    }

    impl DataContext for Store {
        fn set<E: Entity>(&self, name: &str) -> Result<EntityQuery<'_, E>, DataError> {
            self.0.set(name)
        }
    }

    crate::container_model! {
        Store;
        products: Product,
        orders: Order => InMemory::with_expiration_secs("orders-v1", 60),
    }

    /// Container cached as a whole under `catalog`
    #[derive(Clone, Default)]
    pub struct Catalog(FakeDataContext);

    impl Catalog {
        pub fn new(context: FakeDataContext) -> Self {
            Self(context)
        }
    }

    impl DataContext for Catalog {
        fn set<E: Entity>(&self, name: &str) -> Result<EntityQuery<'_, E>, DataError> {
            self.0.set(name)
        }
    }

    crate::container_model! {
        Catalog => InMemory::new("catalog");
        items: Item,
    }
}
