use std::collections::HashMap;

use cachestorm_domain::TypeKey;
use tracing::trace;

use super::model::{ContainerMetadata, ContainerModel};

/// Insertion-ordered set of known container models
///
/// Stands in for program-wide type discovery: every container the engine can
/// find must be registered here. Registering a container twice keeps the
/// first model.
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    models: Vec<ContainerModel>,
    index: HashMap<TypeKey, usize>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`register`](Self::register)
    pub fn with<C: ContainerMetadata>(mut self) -> Self {
        self.register::<C>();
        self
    }

    /// Register container `C` from its published model
    pub fn register<C: ContainerMetadata>(&mut self) -> &mut Self {
        if !self.index.contains_key(&TypeKey::of::<C>()) {
            self.insert(C::model());
        }
        self
    }

    /// Register a hand-built model; returns `false` if the container is known
    pub fn insert(&mut self, model: ContainerModel) -> bool {
        let key = model.container();
        if self.index.contains_key(&key) {
            return false;
        }
        let members = model.members().len();
        trace!(container = key.short_name(), members, "Registered container");
        self.index.insert(key, self.models.len());
        self.models.push(model);
        true
    }

    pub fn get(&self, container: TypeKey) -> Option<&ContainerModel> {
        self.index.get(&container).map(|&i| &self.models[i])
    }

    pub fn contains(&self, container: TypeKey) -> bool {
        self.index.contains_key(&container)
    }

    /// Models in registration order
    pub fn models(&self) -> impl Iterator<Item = &ContainerModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{Catalog, Store};

    #[test]
    fn test_registration_order_and_dedup() {
        let mut registry = MetadataRegistry::new().with::<Store>().with::<Catalog>();
        registry.register::<Store>();

        assert_eq!(registry.len(), 2);
        let order: Vec<_> = registry.models().map(ContainerModel::container).collect();
        assert_eq!(order, [TypeKey::of::<Store>(), TypeKey::of::<Catalog>()]);
        assert!(!registry.insert(<Store as ContainerMetadata>::model()));
    }

    #[test]
    fn test_lookup() {
        let registry = MetadataRegistry::new().with::<Catalog>();
        assert!(registry.contains(TypeKey::of::<Catalog>()));
        assert!(registry.get(TypeKey::of::<Store>()).is_none());
        assert!(!registry.is_empty());
    }
}
