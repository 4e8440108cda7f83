//! Shared fixtures for `cachestorm-infra` integration tests.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cachestorm_core::testing::fixtures::{Catalog, Item, Order, Product, Store};
use cachestorm_core::testing::FakeDataContext;
use cachestorm_core::MetadataRegistry;
use cachestorm_infra::ServiceCollection;

pub fn registry() -> MetadataRegistry {
    MetadataRegistry::new().with::<Store>().with::<Catalog>()
}

pub fn store_context() -> FakeDataContext {
    FakeDataContext::new()
        .with_rows(vec![Product::new(1, "tea"), Product::new(2, "coffee")])
        .with_rows(vec![Order::new(10, 1), Order::new(11, 2), Order::new(12, 2)])
}

pub fn catalog_context() -> FakeDataContext {
    FakeDataContext::new().with_rows((1..=4).map(Item::new).collect())
}

/// Services with both containers registered; returns the store
/// construction counter
pub fn shop_services() -> (ServiceCollection, Arc<AtomicUsize>) {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);

    let mut services = ServiceCollection::new();
    services
        .add_data_context(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(Store::new(store_context()))
        })
        .add_data_context(|| Ok::<_, Infallible>(Catalog::new(catalog_context())));
    (services, constructed)
}
