//! Per-entry cache population with failure isolation
//!
//! For every [`ScanEntry`] the populator opens a fresh scope, skips the entry
//! if its key is already cached, otherwise materializes the collection and
//! stores it under the policy key. The scope is dropped on every exit path.

use std::sync::Arc;

use cachestorm_common::sync::KeyLocks;
use cachestorm_domain::{FailurePolicy, TypeKey};
use tracing::{debug, info, trace, warn};

use crate::errors::{EntryFailure, MaterializationError, PopulateError};
use crate::materializer::EntityMaterializer;
use crate::ports::{CacheStore, ContainerFactory};
use crate::scanner::ScanEntry;

/// What happened to one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Key was already present; nothing was read
    Skipped,
    Populated { rows: usize },
    Failed(MaterializationError),
}

/// Outcome of one entry together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub key: String,
    pub container: TypeKey,
    pub member: &'static str,
    pub outcome: EntryOutcome,
}

/// Summary of a populate pass, entries in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    entries: Vec<EntryReport>,
}

impl PopulateReport {
    pub fn entries(&self) -> &[EntryReport] {
        &self.entries
    }

    pub fn populated(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Populated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    /// `Ok(self)` when nothing failed, otherwise [`PopulateError::Incomplete`]
    pub fn into_result(self) -> Result<Self, PopulateError> {
        if self.is_complete() {
            return Ok(self);
        }
        let total = self.entries.len();
        let failures = self
            .entries
            .into_iter()
            .filter_map(|entry| match entry.outcome {
                EntryOutcome::Failed(error) => Some(EntryFailure {
                    key: entry.key,
                    container: entry.container.name(),
                    member: entry.member,
                    error,
                }),
                _ => None,
            })
            .collect();
        Err(PopulateError::Incomplete { failures, total })
    }

    fn count(&self, predicate: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Writes materialized collections into a [`CacheStore`]
pub struct CachePopulator<'a, F: ?Sized> {
    cache: Arc<dyn CacheStore>,
    containers: &'a F,
    materializer: EntityMaterializer,
    failure_policy: FailurePolicy,
    key_locks: Option<KeyLocks>,
    quiet: bool,
}

impl<'a, F> CachePopulator<'a, F>
where
    F: ContainerFactory + ?Sized,
{
    /// Populator writing to `cache` with containers from `containers`
    pub fn new(cache: Arc<dyn CacheStore>, containers: &'a F) -> Self {
        Self {
            cache,
            containers,
            materializer: EntityMaterializer::new(),
            failure_policy: FailurePolicy::default(),
            key_locks: None,
            quiet: false,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Serialize check-then-set for each key across concurrent passes
    ///
    /// Passes sharing one [`KeyLocks`] never materialize the same key twice.
    pub fn with_key_locks(mut self, locks: KeyLocks) -> Self {
        self.key_locks = Some(locks);
        self
    }

    /// Log failed entries and the pass summary at trace level only
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Populate every entry in order
    ///
    /// # Errors
    /// Only under [`FailurePolicy::AbortOnFirstFailure`]: the first failure is
    /// returned and later entries are not attempted. Otherwise failures are
    /// recorded in the report.
    pub fn populate(&self, entries: &[ScanEntry]) -> Result<PopulateReport, PopulateError> {
        let mut report = PopulateReport::default();

        for entry in entries {
            let outcome = self.populate_entry(entry);

            if let EntryOutcome::Failed(err) = &outcome {
                self.log_failure(entry, err);
                if self.failure_policy == FailurePolicy::AbortOnFirstFailure {
                    return Err(PopulateError::Materialization(err.clone()));
                }
            }

            report.entries.push(EntryReport {
                key: entry.key().to_owned(),
                container: entry.container(),
                member: entry.member(),
                outcome,
            });
        }

        let (populated, skipped, failed) = (report.populated(), report.skipped(), report.failed());
        if self.quiet {
            trace!(populated, skipped, failed, "Cache population pass finished");
        } else {
            info!(populated, skipped, failed, "Cache population pass finished");
        }

        Ok(report)
    }

    fn log_failure(&self, entry: &ScanEntry, err: &MaterializationError) {
        let (key, member) = (entry.key(), entry.member());
        let container = entry.container().short_name();
        if self.quiet {
            trace!(key, container, member, error = %err, "Failed to populate cache entry");
        } else {
            warn!(key, container, member, error = %err, "Failed to populate cache entry");
        }
    }

    /// Populate a single entry; never panics on data-source failures
    pub fn populate_entry(&self, entry: &ScanEntry) -> EntryOutcome {
        let result = match &self.key_locks {
            Some(locks) => locks.with_lock(entry.key(), || self.check_then_set(entry)),
            None => self.check_then_set(entry),
        };
        result.unwrap_or_else(EntryOutcome::Failed)
    }

    fn check_then_set(&self, entry: &ScanEntry) -> Result<EntryOutcome, MaterializationError> {
        let scope = self.containers.create_scope().map_err(|source| {
            let container = entry.container().name();
            MaterializationError::ContainerUnavailable { container, source }
        })?;

        if self.cache.contains(entry.key()) {
            return Ok(EntryOutcome::Skipped);
        }

        let snapshot = self.materializer.materialize(scope.as_ref(), entry)?;
        let rows = snapshot.len();
        self.cache.set(entry.key(), snapshot, entry.policy().expiration());

        let (key, member) = (entry.key(), entry.member());
        if self.quiet {
            trace!(key, member, rows, "Populated cache entry");
        } else {
            debug!(key, member, rows, "Populated cache entry");
        }

        Ok(EntryOutcome::Populated { rows })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::metadata::{ContainerMetadata, ContainerModel};
    use crate::scanner::MetadataScanner;
    use crate::snapshot::EntitySnapshot;
    use crate::testing::fixtures::{Catalog, Order, Product, Store};
    use crate::testing::{FakeDataContext, RecordingCacheStore, StaticResolver};
    use cachestorm_domain::InMemory;

    fn entries() -> Vec<ScanEntry> {
        let model = ContainerModel::builder::<Store>()
            .cached_collection::<Product>("products", InMemory::new("products"))
            .cached_collection::<Order>("orders", InMemory::with_expiration_secs("orders", 60))
            .build();
        MetadataScanner::new().scan(&model)
    }

    fn resolver(context: FakeDataContext) -> StaticResolver {
        StaticResolver::new().with_instance(Store::new(context))
    }

    /// Verifies the happy path stores every collection with its TTL.
    ///
    /// Assertions:
    /// - both keys are written once
    /// - TTLs follow the policies
    /// - every scope is released
    #[test]
    fn test_populates_all_entries() {
        let cache = Arc::new(RecordingCacheStore::new());
        let resolver = resolver(
            FakeDataContext::new()
                .with_rows(vec![Product::new(1, "tea")])
                .with_rows(vec![Order::new(1, 1), Order::new(2, 1)]),
        );

        let report = CachePopulator::new(cache.clone(), &resolver).populate(&entries()).unwrap();

        assert_eq!(report.populated(), 2);
        assert!(report.is_complete());
        assert_eq!(cache.ttl("products"), Some(Duration::from_secs(1800)));
        assert_eq!(cache.ttl("orders"), Some(Duration::from_secs(60)));
        assert_eq!(cache.snapshot("orders").unwrap().len(), 2);
        assert_eq!(resolver.open_scopes(), 0);
        assert_eq!(resolver.scopes_created(), 2);
    }

    /// Verifies present keys are skipped without materializing.
    ///
    /// Assertions:
    /// - the pre-seeded value is untouched
    /// - the data context is never read
    #[test]
    fn test_existing_key_skipped() {
        let cache = Arc::new(RecordingCacheStore::new());
        let seeded = EntitySnapshot::new(vec![Product::new(9, "seed")]);
        cache.set("products", seeded.clone(), Duration::from_secs(5));
        let context = FakeDataContext::new().with_rows(Vec::<Product>::new());
        let reads = context.reads();
        let resolver = resolver(context);

        let entry = &entries()[0];
        let outcome = CachePopulator::new(cache.clone(), &resolver).populate_entry(entry);

        assert_eq!(outcome, EntryOutcome::Skipped);
        assert!(cache.snapshot("products").unwrap().ptr_eq(&seeded));
        assert_eq!(reads.get(), 0);
    }

    /// Verifies one failing entry does not stop the rest.
    ///
    /// Assertions:
    /// - products fail (missing collection), orders still populate
    /// - `into_result` reports one failure out of two
    #[test]
    fn test_failure_isolation() {
        let cache = Arc::new(RecordingCacheStore::new());
        let resolver = resolver(FakeDataContext::new().with_rows(vec![Order::new(1, 1)]));

        let report = CachePopulator::new(cache.clone(), &resolver).populate(&entries()).unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.populated(), 1);
        assert!(!cache.contains("products"));
        assert!(cache.contains("orders"));
        assert_eq!(resolver.open_scopes(), 0);

        match report.into_result() {
            Err(PopulateError::Incomplete { failures, total }) => {
                assert_eq!(total, 2);
                assert_eq!(failures[0].key, "products");
                assert_eq!(failures[0].member, "products");
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    /// Verifies abort-on-first-failure stops the pass.
    ///
    /// Assertions:
    /// - the first failure is returned
    /// - the later entry is never written
    #[test]
    fn test_abort_on_first_failure() {
        let cache = Arc::new(RecordingCacheStore::new());
        let resolver = resolver(FakeDataContext::new().with_rows(vec![Order::new(1, 1)]));

        let err = CachePopulator::new(cache.clone(), &resolver)
            .with_failure_policy(FailurePolicy::AbortOnFirstFailure)
            .populate(&entries())
            .unwrap_err();

        assert!(matches!(
            err,
            PopulateError::Materialization(MaterializationError::Accessor { .. })
        ));
        assert!(!cache.contains("orders"));
    }

    /// Verifies unresolvable containers fail only their own entries.
    ///
    /// Assertions:
    /// - catalog entries fail with `ContainerUnavailable`
    /// - store entries still populate
    #[test]
    fn test_unresolvable_container() {
        let cache = Arc::new(RecordingCacheStore::new());
        let resolver = StaticResolver::new()
            .with_instance(Store::new(FakeDataContext::new().with_rows(vec![Order::new(1, 1)])))
            .with_failing::<Catalog>("connection string missing");
        let scanner = MetadataScanner::new();
        let mut entries = scanner.scan(&<Catalog as ContainerMetadata>::model());
        entries.extend(scanner.scan(&<Store as ContainerMetadata>::model()));

        let report = CachePopulator::new(cache.clone(), &resolver).populate(&entries).unwrap();

        assert!(matches!(
            report.entries()[0].outcome,
            EntryOutcome::Failed(MaterializationError::ContainerUnavailable { .. })
        ));
        assert_eq!(report.entries()[0].container.short_name(), "Catalog");
        assert!(cache.contains("orders-v1"));
        assert!(!cache.contains("catalog"));
    }

    /// Verifies per-key locking still populates through the lock.
    ///
    /// Assertions:
    /// - the entry populates once and a second pass skips it
    #[test]
    fn test_with_key_locks() {
        let cache = Arc::new(RecordingCacheStore::new());
        let resolver = resolver(FakeDataContext::new().with_rows(vec![Product::new(1, "tea")]));
        let populator =
            CachePopulator::new(cache.clone(), &resolver).with_key_locks(KeyLocks::new());

        let entry = &entries()[0];
        assert_eq!(populator.populate_entry(entry), EntryOutcome::Populated { rows: 1 });
        assert_eq!(populator.populate_entry(entry), EntryOutcome::Skipped);
        assert_eq!(cache.set_calls(), 1);
    }
}
