use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cachestorm_core::{
    CacheStore, ContainerFactory, ContainerScope, Instance, ResolveError, ServiceResolver,
};
use cachestorm_domain::TypeKey;
use parking_lot::Mutex;
use tracing::trace;

use super::collection::{Lifetime, ServiceDescriptor};

struct ProviderInner {
    descriptors: HashMap<TypeKey, ServiceDescriptor>,
    singletons: Mutex<HashMap<TypeKey, Instance>>,
    cache: Option<Arc<dyn CacheStore>>,
    active_scopes: AtomicUsize,
}

/// Built service resolver
///
/// Clones share singletons and the active scope count.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    pub(crate) fn new(
        descriptors: Vec<ServiceDescriptor>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        let descriptors = descriptors.into_iter().map(|d| (d.service, d)).collect();
        Self {
            inner: Arc::new(ProviderInner {
                descriptors,
                singletons: Mutex::new(HashMap::new()),
                cache,
                active_scopes: AtomicUsize::new(0),
            }),
        }
    }

    /// Open a scope for scoped services
    pub fn scope(&self) -> ServiceScope<'_> {
        let open = self.inner.active_scopes.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(active_scopes = open, "Opened service scope");
        ServiceScope { provider: self, scoped: Mutex::new(HashMap::new()) }
    }

    /// Scopes opened and not yet dropped
    pub fn active_scopes(&self) -> usize {
        self.inner.active_scopes.load(Ordering::SeqCst)
    }

    fn singleton(&self, descriptor: &ServiceDescriptor) -> Result<Instance, ResolveError> {
        let mut singletons = self.inner.singletons.lock();
        if let Some(instance) = singletons.get(&descriptor.service) {
            return Ok(Arc::clone(instance));
        }
        let instance = (descriptor.factory)()?;
        singletons.insert(descriptor.service, Arc::clone(&instance));
        Ok(instance)
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.descriptors.len())
            .field("active_scopes", &self.active_scopes())
            .finish()
    }
}

impl ContainerFactory for ServiceProvider {
    fn create_scope(&self) -> Result<Box<dyn ContainerScope + '_>, ResolveError> {
        Ok(Box::new(self.scope()))
    }
}

impl ServiceResolver for ServiceProvider {
    fn cache_store(&self) -> Option<Arc<dyn CacheStore>> {
        self.inner.cache.clone()
    }
}

/// Lifetime boundary for scoped services
///
/// Scoped instances are dropped together with the scope.
pub struct ServiceScope<'a> {
    provider: &'a ServiceProvider,
    scoped: Mutex<HashMap<TypeKey, Instance>>,
}

impl ServiceScope<'_> {
    /// Resolve `T` and downcast it
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let instance = self.resolve(TypeKey::of::<T>())?;
        instance.downcast::<T>().map_err(|_| ResolveError::Construction {
            type_name: std::any::type_name::<T>(),
            message: "registered instance has a different type".into(),
        })
    }
}

impl ContainerScope for ServiceScope<'_> {
    fn resolve(&self, service: TypeKey) -> Result<Instance, ResolveError> {
        let descriptor = self
            .provider
            .inner
            .descriptors
            .get(&service)
            .ok_or(ResolveError::NotRegistered { type_name: service.name() })?;

        match descriptor.lifetime {
            Lifetime::Singleton => self.provider.singleton(descriptor),
            Lifetime::Transient => (descriptor.factory)(),
            Lifetime::Scoped => {
                let mut scoped = self.scoped.lock();
                if let Some(instance) = scoped.get(&service) {
                    return Ok(Arc::clone(instance));
                }
                let instance = (descriptor.factory)()?;
                scoped.insert(service, Arc::clone(&instance));
                Ok(instance)
            }
        }
    }
}

impl Drop for ServiceScope<'_> {
    fn drop(&mut self) {
        let open = self.provider.inner.active_scopes.fetch_sub(1, Ordering::SeqCst) - 1;
        let released = self.scoped.get_mut().len();
        trace!(active_scopes = open, released, "Closed service scope");
    }
}
