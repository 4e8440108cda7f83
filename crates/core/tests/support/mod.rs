//! Shared fixtures for `cachestorm-core` integration tests.
//!
//! Builds the store used across the end-to-end scenarios: five products and
//! three orders behind a resolver that also exposes a recording cache.

use std::sync::Arc;

use cachestorm_core::testing::fixtures::{Order, Product, Store};
use cachestorm_core::testing::{FakeDataContext, RecordingCacheStore, StaticResolver};

pub fn products() -> Vec<Product> {
    ["tea", "coffee", "cocoa", "mate", "chai"]
        .iter()
        .zip(1..)
        .map(|(name, id)| Product::new(id, name))
        .collect()
}

pub fn orders() -> Vec<Order> {
    vec![Order::new(1, 1), Order::new(2, 3), Order::new(3, 3)]
}

pub fn store_context() -> FakeDataContext {
    FakeDataContext::new().with_rows(products()).with_rows(orders())
}

/// Resolver over a fresh store and the returned cache
pub fn store_resolver() -> (StaticResolver, Arc<RecordingCacheStore>) {
    let cache = Arc::new(RecordingCacheStore::new());
    let resolver =
        StaticResolver::new().with_cache(cache.clone()).with_instance(Store::new(store_context()));
    (resolver, cache)
}
