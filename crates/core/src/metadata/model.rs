use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use cachestorm_domain::{InMemory, TypeKey};

use crate::materializer::{EntityCollectionProvider, TypedCollectionProvider};
use crate::ports::{DataContext, Entity};

/// One collection member of a container
#[derive(Clone)]
pub struct MemberModel {
    name: &'static str,
    entity: TypeKey,
    policy: Option<InMemory>,
    provider: Arc<dyn EntityCollectionProvider>,
}

impl MemberModel {
    /// Accessor name of the member
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn entity(&self) -> TypeKey {
        self.entity
    }

    /// Member-level marker, if declared
    pub fn policy(&self) -> Option<&InMemory> {
        self.policy.as_ref()
    }

    pub fn provider(&self) -> &Arc<dyn EntityCollectionProvider> {
        &self.provider
    }
}

impl fmt::Debug for MemberModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberModel")
            .field("name", &self.name)
            .field("entity", &self.entity)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Container type with its optional marker and ordered members
#[derive(Debug, Clone)]
pub struct ContainerModel {
    container: TypeKey,
    policy: Option<InMemory>,
    members: Vec<MemberModel>,
}

impl ContainerModel {
    /// Start describing container `C`
    pub fn builder<C: DataContext>() -> ContainerModelBuilder<C> {
        ContainerModelBuilder {
            model: ContainerModel {
                container: TypeKey::of::<C>(),
                policy: None,
                members: Vec::new(),
            },
            _container: PhantomData,
        }
    }

    pub fn container(&self) -> TypeKey {
        self.container
    }

    /// Container-level marker; overrides every member marker when present
    pub fn policy(&self) -> Option<&InMemory> {
        self.policy.as_ref()
    }

    /// Members in declaration order
    pub fn members(&self) -> &[MemberModel] {
        &self.members
    }

    /// Whether anything in this container is marked for caching
    pub fn is_cacheable(&self) -> bool {
        self.policy.is_some() || self.members.iter().any(|m| m.policy.is_some())
    }
}

/// Builder for [`ContainerModel`]
pub struct ContainerModelBuilder<C> {
    model: ContainerModel,
    _container: PhantomData<fn() -> C>,
}

impl<C: DataContext> ContainerModelBuilder<C> {
    /// Mark the whole container
    pub fn in_memory(mut self, marker: InMemory) -> Self {
        self.model.policy = Some(marker);
        self
    }

    /// Add a member with an optional marker
    pub fn member<E: Entity>(mut self, name: &'static str, policy: Option<InMemory>) -> Self {
        self.model.members.push(MemberModel {
            name,
            entity: TypeKey::of::<E>(),
            policy,
            provider: Arc::new(TypedCollectionProvider::<C, E>::new()),
        });
        self
    }

    /// Add an unmarked member
    pub fn collection<E: Entity>(self, name: &'static str) -> Self {
        self.member::<E>(name, None)
    }

    /// Add a member carrying its own marker
    pub fn cached_collection<E: Entity>(self, name: &'static str, marker: InMemory) -> Self {
        self.member::<E>(name, Some(marker))
    }

    pub fn build(self) -> ContainerModel {
        self.model
    }
}

/// Implemented by containers that publish a [`ContainerModel`]
pub trait ContainerMetadata: DataContext {
    fn model() -> ContainerModel;
}

/// Implement [`ContainerMetadata`] for a data context
///
/// ```ignore
/// container_model! {
///     Store;
///     products: Product,
///     orders: Order => InMemory::with_expiration_secs("orders-v1", 60),
/// }
///
/// container_model! {
///     Catalog => InMemory::new("catalog");
///     items: Item,
/// }
/// ```
#[macro_export]
macro_rules! container_model {
    (@policy) => {
        None
    };
    (@policy $marker:expr) => {
        Some($marker)
    };
    (
        $container:ty $(=> $policy:expr)? ;
        $($member:ident : $entity:ty $(=> $member_policy:expr)?),* $(,)?
    ) => {
        impl $crate::metadata::ContainerMetadata for $container {
            fn model() -> $crate::metadata::ContainerModel {
                let builder = $crate::metadata::ContainerModel::builder::<$container>();
                $(let builder = builder.in_memory($policy);)?
                $(
                    let builder = builder.member::<$entity>(
                        stringify!($member),
                        $crate::container_model!(@policy $($member_policy)?),
                    );
                )*
                builder.build()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{Catalog, Item, Order, Product, Store};

    /// Verifies the builder keeps declaration order and markers.
    ///
    /// Assertions:
    /// - members come back in the order they were declared
    /// - only `orders` carries a member marker
    /// - the store has no container marker
    #[test]
    fn test_store_model() {
        let model = <Store as ContainerMetadata>::model();

        assert_eq!(model.container(), TypeKey::of::<Store>());
        assert!(model.policy().is_none());
        let names: Vec<_> = model.members().iter().map(MemberModel::name).collect();
        assert_eq!(names, ["products", "orders"]);
        assert!(model.members()[0].policy().is_none());
        assert_eq!(model.members()[1].policy().map(InMemory::key), Some("orders-v1"));
        assert_eq!(model.members()[1].entity(), TypeKey::of::<Order>());
        assert_eq!(model.members()[0].provider().entity(), TypeKey::of::<Product>());
        assert!(model.is_cacheable());
    }

    /// Verifies a container-level marker is recorded.
    ///
    /// Assertions:
    /// - the catalog carries its marker
    /// - the provider reads from the catalog type
    #[test]
    fn test_container_marker() {
        let model = <Catalog as ContainerMetadata>::model();
        assert_eq!(model.policy().map(InMemory::key), Some("catalog"));
        assert_eq!(model.members()[0].entity(), TypeKey::of::<Item>());
        assert_eq!(model.members()[0].provider().container(), TypeKey::of::<Catalog>());
    }

    #[test]
    fn test_unmarked_container_is_not_cacheable() {
        let model = ContainerModel::builder::<Store>().collection::<Product>("products").build();
        assert!(!model.is_cacheable());
    }
}
