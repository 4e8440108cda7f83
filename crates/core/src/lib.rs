//! # CacheStorm Core
//!
//! Cache warm-up engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - Container metadata and the registry that replaces runtime discovery
//! - Port interfaces for data contexts, cache stores and service resolution
//! - The scan, materialize and populate pipeline
//! - Registration-time and resolution-time entry points
//!
//! ## Architecture Principles
//! - Only depends on `cachestorm-common` and `cachestorm-domain`
//! - No concrete cache, container or DI implementation
//! - All external collaborators via traits

pub mod errors;
pub mod locator;
pub mod materializer;
pub mod metadata;
pub mod populator;
pub mod ports;
pub mod scanner;
pub mod snapshot;
pub mod warmup;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use errors::{
    ConfigurationError, DataError, EntryFailure, MaterializationError, PopulateError,
    PopulateResult, ResolveError,
};
pub use locator::ContainerLocator;
pub use materializer::{EntityCollectionProvider, EntityMaterializer, TypedCollectionProvider};
pub use metadata::{ContainerMetadata, ContainerModel, MemberModel, MetadataRegistry};
pub use populator::{CachePopulator, EntryOutcome, EntryReport, PopulateReport};
pub use ports::{
    CacheStore, ContainerFactory, ContainerScope, DataContext, DiagnosticSink, Entity,
    EntityQuery, Instance, ServiceRegistrations, ServiceResolver, TracingSink,
};
pub use scanner::{MetadataScanner, ScanEntry};
pub use snapshot::EntitySnapshot;
pub use warmup::{RegistrationWarmupExt, ResolutionWarmupExt, Warmup};
