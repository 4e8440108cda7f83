use std::any;
use std::fmt;
use std::sync::Arc;

use cachestorm_core::{
    CacheStore, DataContext, Instance, ResolveError, ServiceRegistrations, ServiceResolver,
};
use cachestorm_domain::TypeKey;

use super::provider::ServiceProvider;

/// How long a resolved instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per provider
    Singleton,
    /// One instance per scope, released with the scope
    Scoped,
    /// A new instance on every resolution
    Transient,
}

pub(crate) type Factory = Arc<dyn Fn() -> Result<Instance, ResolveError> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct ServiceDescriptor {
    pub(crate) service: TypeKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) factory: Factory,
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service.short_name())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Ordered list of service registrations
///
/// Registering a type again replaces how it is resolved but keeps its
/// original position in [`registered_types`](ServiceRegistrations::registered_types).
#[derive(Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made shared instance
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        let instance: Instance = Arc::new(instance);
        self.push::<T>(Lifetime::Singleton, Arc::new(move || Ok(Arc::clone(&instance))))
    }

    /// Register a factory invoked once per scope
    pub fn add_scoped<T, E, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        E: fmt::Display,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.push::<T>(Lifetime::Scoped, erase(factory))
    }

    /// Register a factory invoked on every resolution
    pub fn add_transient<T, E, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        E: fmt::Display,
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        self.push::<T>(Lifetime::Transient, erase(factory))
    }

    /// Register a data context; contexts are scoped
    pub fn add_data_context<C, E, F>(&mut self, factory: F) -> &mut Self
    where
        C: DataContext,
        E: fmt::Display,
        F: Fn() -> Result<C, E> + Send + Sync + 'static,
    {
        self.add_scoped(factory)
    }

    /// Register the shared cache store the warm-up writes into
    pub fn add_cache_store<S: CacheStore + 'static>(&mut self, store: S) -> &mut Self {
        self.cache = Some(Arc::new(store));
        self
    }

    /// Register an already shared cache store
    pub fn add_shared_cache_store(&mut self, store: Arc<dyn CacheStore>) -> &mut Self {
        self.cache = Some(store);
        self
    }

    pub fn contains(&self, service: TypeKey) -> bool {
        self.descriptors.iter().any(|d| d.service == service)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Build a provider over a snapshot of the current registrations
    pub fn build(&self) -> ServiceProvider {
        ServiceProvider::new(self.descriptors.clone(), self.cache.clone())
    }

    fn push<T: 'static>(&mut self, lifetime: Lifetime, factory: Factory) -> &mut Self {
        let service = TypeKey::of::<T>();
        let descriptor = ServiceDescriptor { service, lifetime, factory };
        match self.descriptors.iter_mut().find(|d| d.service == service) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
        self
    }
}

fn erase<T, E, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    E: fmt::Display,
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
{
    Arc::new(move || {
        factory().map(|value| Arc::new(value) as Instance).map_err(|err| {
            let type_name = any::type_name::<T>();
            ResolveError::Construction { type_name, message: err.to_string() }
        })
    })
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("descriptors", &self.descriptors)
            .field("cache_store", &self.cache.is_some())
            .finish()
    }
}

impl ServiceRegistrations for ServiceCollection {
    fn registered_types(&self) -> Vec<TypeKey> {
        self.descriptors.iter().map(|d| d.service).collect()
    }

    fn build_resolver(&self) -> Result<Box<dyn ServiceResolver>, ResolveError> {
        Ok(Box::new(self.build()))
    }
}
