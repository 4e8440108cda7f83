//! Materialized collection snapshots

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cachestorm_domain::TypeKey;

use crate::ports::Entity;

/// Fully enumerated, type-erased collection of one entity type
///
/// Disconnected from the data context it was read from. Cloning shares the
/// rows.
#[derive(Clone)]
pub struct EntitySnapshot {
    entity: TypeKey,
    len: usize,
    rows: Arc<dyn Any + Send + Sync>,
}

impl EntitySnapshot {
    /// Wrap materialized rows
    pub fn new<E: Entity>(rows: Vec<E>) -> Self {
        Self { entity: TypeKey::of::<E>(), len: rows.len(), rows: Arc::new(rows) }
    }

    /// Entity type held by this snapshot
    pub fn entity(&self) -> TypeKey {
        self.entity
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the collection was empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the rows as `E`; `None` if the snapshot holds another type
    pub fn rows<E: Entity>(&self) -> Option<&[E]> {
        self.rows.downcast_ref::<Vec<E>>().map(Vec::as_slice)
    }

    /// Copy the rows out as `E`
    pub fn to_vec<E: Entity>(&self) -> Option<Vec<E>> {
        self.rows::<E>().map(<[E]>::to_vec)
    }

    /// Whether two snapshots share the same row allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }
}

impl fmt::Debug for EntitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySnapshot")
            .field("entity", &self.entity.short_name())
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Order {
        id: u32,
    }

    impl Entity for Order {}

    #[derive(Debug, Clone, PartialEq)]
    struct Product;

    impl Entity for Product {}

    #[test]
    fn test_typed_access() {
        let snapshot = EntitySnapshot::new(vec![Order { id: 1 }, Order { id: 2 }]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.entity(), TypeKey::of::<Order>());
        assert_eq!(snapshot.rows::<Order>().map(<[Order]>::len), Some(2));
        assert!(snapshot.rows::<Product>().is_none());
        assert_eq!(snapshot.to_vec::<Order>().unwrap()[1], Order { id: 2 });
    }

    #[test]
    fn test_clone_shares_rows() {
        let snapshot = EntitySnapshot::new(Vec::<Order>::new());
        let clone = snapshot.clone();
        assert!(snapshot.is_empty());
        assert!(snapshot.ptr_eq(&clone));
        assert_eq!(format!("{snapshot:?}"), "EntitySnapshot { entity: \"Order\", len: 0 }");
    }
}
