//! Warms a moka cache from a small in-memory "database".
//!
//! Run with `RUST_LOG=debug` to see per-entry events.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use cachestorm_core::{
    container_model, CacheStore, DataContext, DataError, Entity, EntityQuery, MetadataRegistry,
    ResolutionWarmupExt, TracingSink,
};
use cachestorm_domain::InMemory;
use cachestorm_infra::{config, init_tracing, MokaCacheStore, ServiceCollection};

#[derive(Debug, Clone)]
struct Country {
    code: &'static str,
}

impl Entity for Country {}

#[derive(Debug, Clone)]
struct Currency {
    code: &'static str,
}

impl Entity for Currency {
    fn qualified_name() -> &'static str {
        "reference.currency"
    }
}

/// Reference data context over fixed tables
struct ReferenceData {
    countries: Vec<Country>,
    currencies: Vec<Currency>,
}

impl DataContext for ReferenceData {
    fn set<E: Entity>(&self, name: &str) -> Result<EntityQuery<'_, E>, DataError> {
        let tables: HashMap<&str, &(dyn std::any::Any + Send + Sync)> = HashMap::from([
            (Country::qualified_name(), &self.countries as &(dyn std::any::Any + Send + Sync)),
            (Currency::qualified_name(), &self.currencies as &(dyn std::any::Any + Send + Sync)),
        ]);
        let rows = tables
            .get(name)
            .and_then(|table| table.downcast_ref::<Vec<E>>())
            .ok_or_else(|| DataError::new(format!("unknown table '{name}'")))?;
        Ok(Box::new(rows.iter().cloned().map(Ok)))
    }
}

container_model! {
    ReferenceData;
    countries: Country => InMemory::new("countries"),
    currencies: Currency => InMemory::with_expiration_secs("currencies", 3600),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(true)?;
    let warmup_config = config::load()?;
    tracing::info!(?warmup_config, "Loaded configuration");

    let store = MokaCacheStore::default();
    let mut services = ServiceCollection::new();
    services
        .add_data_context(|| {
            Ok::<_, Infallible>(ReferenceData {
                countries: vec![Country { code: "NZ" }, Country { code: "CA" }],
                currencies: vec![Currency { code: "NZD" }],
            })
        })
        .add_shared_cache_store(Arc::new(store.clone()));

    let registry = MetadataRegistry::new().with::<ReferenceData>();
    services.build().populate_memory_cache(&registry, Some(&TracingSink));

    if let Some(countries) = store.get("countries") {
        let codes: Vec<_> =
            countries.rows::<Country>().unwrap_or_default().iter().map(|c| c.code).collect();
        tracing::info!(?codes, "Cached countries");
    }
    if let Some(currencies) = store.get("currencies") {
        let codes: Vec<_> =
            currencies.rows::<Currency>().unwrap_or_default().iter().map(|c| c.code).collect();
        tracing::info!(?codes, "Cached currencies");
    }

    Ok(())
}
