//! Materialization of one (container, entity) collection into a snapshot

use std::any::{self, Any};
use std::fmt;
use std::marker::PhantomData;

use cachestorm_domain::TypeKey;

use crate::errors::{DataError, MaterializationError};
use crate::ports::{ContainerScope, DataContext, Entity};
use crate::scanner::ScanEntry;
use crate::snapshot::EntitySnapshot;

/// Type-erased accessor for one collection of a container
///
/// Registered once per member in a [`crate::metadata::ContainerModel`] so the
/// engine can read `Vec<E>` out of a container it only knows by
/// [`TypeKey`].
pub trait EntityCollectionProvider: Send + Sync {
    /// Entity type the provider yields
    fn entity(&self) -> TypeKey;

    /// Container type the provider reads from
    fn container(&self) -> TypeKey;

    /// Read the full collection out of a resolved container instance
    fn materialize(
        &self,
        container: &(dyn Any + Send + Sync),
    ) -> Result<EntitySnapshot, MaterializationError>;
}

/// [`EntityCollectionProvider`] for container `C` and entity `E`
pub struct TypedCollectionProvider<C, E> {
    _marker: PhantomData<fn() -> (C, E)>,
}

impl<C, E> TypedCollectionProvider<C, E> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<C, E> Default for TypedCollectionProvider<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> fmt::Debug for TypedCollectionProvider<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCollectionProvider")
            .field("container", &any::type_name::<C>())
            .field("entity", &any::type_name::<E>())
            .finish()
    }
}

impl<C: DataContext, E: Entity> EntityCollectionProvider for TypedCollectionProvider<C, E> {
    fn entity(&self) -> TypeKey {
        TypeKey::of::<E>()
    }

    fn container(&self) -> TypeKey {
        TypeKey::of::<C>()
    }

    fn materialize(
        &self,
        container: &(dyn Any + Send + Sync),
    ) -> Result<EntitySnapshot, MaterializationError> {
        let container_name = any::type_name::<C>();
        let entity_name = any::type_name::<E>();

        let context = container
            .downcast_ref::<C>()
            .ok_or(MaterializationError::ContainerTypeMismatch { container: container_name })?;

        let query = context.set::<E>(E::qualified_name()).map_err(|source| {
            MaterializationError::Accessor {
                container: container_name,
                entity: entity_name,
                source,
            }
        })?;

        // Full enumeration; a failing row aborts the whole collection
        let rows = query.collect::<Result<Vec<E>, DataError>>().map_err(|source| {
            MaterializationError::Enumeration {
                container: container_name,
                entity: entity_name,
                source,
            }
        })?;

        Ok(EntitySnapshot::new(rows))
    }
}

/// Resolves containers from a scope and reads collections out of them
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityMaterializer;

impl EntityMaterializer {
    pub fn new() -> Self {
        Self
    }

    /// Materialize `entry` using a container resolved from `scope`
    pub fn materialize(
        &self,
        scope: &dyn ContainerScope,
        entry: &ScanEntry,
    ) -> Result<EntitySnapshot, MaterializationError> {
        let container = entry.container();
        let instance = scope.resolve(container).map_err(|source| {
            MaterializationError::ContainerUnavailable { container: container.name(), source }
        })?;

        entry.provider().materialize(instance.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{Order, Product, Store};
    use crate::testing::FakeDataContext;

    fn store() -> Store {
        Store::new(
            FakeDataContext::new()
                .with_rows(vec![Product::new(1, "tea"), Product::new(2, "coffee")])
                .with_failing_enumeration(vec![Order::new(1, 1)], 1),
        )
    }

    /// Verifies a provider reads every row of its collection.
    ///
    /// Assertions:
    /// - both products come back in order
    /// - the snapshot is tagged with the entity type
    #[test]
    fn test_provider_reads_collection() {
        let provider = TypedCollectionProvider::<Store, Product>::new();
        let snapshot = provider.materialize(&store()).unwrap();

        assert_eq!(snapshot.entity(), TypeKey::of::<Product>());
        let rows = snapshot.rows::<Product>().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "coffee");
    }

    /// Verifies enumeration failures surface as errors, not partial data.
    ///
    /// Assertions:
    /// - a collection failing after one row yields `Enumeration`
    #[test]
    fn test_enumeration_failure_is_not_partial() {
        let provider = TypedCollectionProvider::<Store, Order>::new();
        let err = provider.materialize(&store()).unwrap_err();
        assert!(matches!(err, MaterializationError::Enumeration { .. }));
    }

    /// Verifies a mismatched instance is rejected.
    ///
    /// Assertions:
    /// - downcasting a non-`Store` instance yields `ContainerTypeMismatch`
    #[test]
    fn test_type_mismatch() {
        let provider = TypedCollectionProvider::<Store, Product>::new();
        let err = provider.materialize(&42_u32).unwrap_err();
        assert!(matches!(err, MaterializationError::ContainerTypeMismatch { .. }));
    }

    /// Verifies a missing accessor is reported as such.
    ///
    /// Assertions:
    /// - a context without the collection yields `Accessor`
    #[test]
    fn test_missing_collection() {
        let provider = TypedCollectionProvider::<Store, Product>::new();
        let err = provider.materialize(&Store::new(FakeDataContext::new())).unwrap_err();
        assert!(matches!(err, MaterializationError::Accessor { .. }));
    }
}
