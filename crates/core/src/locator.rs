//! Discovery of eligible container types

use std::collections::HashSet;

use cachestorm_domain::TypeKey;
use tracing::trace;

use crate::metadata::{ContainerModel, MetadataRegistry};
use crate::ports::ServiceRegistrations;

/// Finds container models, either among registered services or program-wide
#[derive(Debug, Clone, Copy)]
pub struct ContainerLocator<'a> {
    registry: &'a MetadataRegistry,
}

impl<'a> ContainerLocator<'a> {
    pub fn new(registry: &'a MetadataRegistry) -> Self {
        Self { registry }
    }

    /// Containers that are registered as services, in registration order
    pub fn registered<S>(&self, services: &S) -> Vec<&'a ContainerModel>
    where
        S: ServiceRegistrations + ?Sized,
    {
        let mut seen = HashSet::new();
        let models: Vec<_> = services
            .registered_types()
            .into_iter()
            .filter(|ty| seen.insert(*ty))
            .filter_map(|ty| self.registry.get(ty))
            .collect();
        trace!(count = models.len(), "Located registered containers");
        models
    }

    /// Every known container, in registry order
    pub fn all(&self) -> Vec<&'a ContainerModel> {
        self.registry.models().collect()
    }

    pub fn contains(&self, container: TypeKey) -> bool {
        self.registry.contains(container)
    }
}
