//! Warm-up entry points
//!
//! | Entry point | Containers considered | No store | Failures |
//! |-------------|----------------------|----------|----------|
//! | registration time | registered services only | silent no-op | swallowed |
//! | resolution time | every registered model | `NoCacheStore` | one sink report |

use cachestorm_common::sync::KeyLocks;
use cachestorm_domain::constants::WARMUP_FAILURE_MESSAGE;
use cachestorm_domain::WarmupConfig;
use tracing::{info_span, trace, trace_span};

use crate::errors::{ConfigurationError, PopulateError};
use crate::locator::ContainerLocator;
use crate::metadata::{ContainerModel, MetadataRegistry};
use crate::populator::{CachePopulator, PopulateReport};
use crate::ports::{DiagnosticSink, ServiceRegistrations, ServiceResolver};
use crate::scanner::MetadataScanner;

/// Runs populate passes against a [`MetadataRegistry`]
#[derive(Debug, Clone)]
pub struct Warmup<'a> {
    registry: &'a MetadataRegistry,
    config: WarmupConfig,
    key_locks: KeyLocks,
}

impl<'a> Warmup<'a> {
    pub fn new(registry: &'a MetadataRegistry) -> Self {
        Self { registry, config: WarmupConfig::default(), key_locks: KeyLocks::new() }
    }

    pub fn with_config(mut self, config: WarmupConfig) -> Self {
        self.config = config;
        self
    }

    /// Share per-key locks with other [`Warmup`]s
    ///
    /// Only consulted when `per_key_lock` is enabled.
    pub fn with_key_locks(mut self, locks: KeyLocks) -> Self {
        self.key_locks = locks;
        self
    }

    pub fn config(&self) -> &WarmupConfig {
        &self.config
    }

    /// Registration-time warm-up; never fails and never panics on data errors
    pub fn at_registration<S>(&self, services: &S)
    where
        S: ServiceRegistrations + ?Sized,
    {
        if let Err(err) = self.try_at_registration(services) {
            trace!(error = %err, "Registration-time warm-up did not complete");
        }
    }

    /// Registration-time warm-up with the outcome exposed
    ///
    /// Returns `Ok(None)` when the pass had nothing to do: warm-up disabled,
    /// no registered containers, or no cache store registered. Every event it
    /// emits is at trace level.
    pub fn try_at_registration<S>(
        &self,
        services: &S,
    ) -> Result<Option<PopulateReport>, PopulateError>
    where
        S: ServiceRegistrations + ?Sized,
    {
        let _span = trace_span!("warmup", entry = "registration").entered();
        if !self.config.enabled {
            return Ok(None);
        }
        self.config.validate().map_err(ConfigurationError::from)?;

        let models = ContainerLocator::new(self.registry).registered(services);
        if models.is_empty() {
            return Ok(None);
        }

        let resolver = services.build_resolver()?;
        if resolver.cache_store().is_none() {
            trace!("No cache store registered; skipping registration-time warm-up");
            return Ok(None);
        }

        self.run(resolver.as_ref(), &models, true).map(Some)
    }

    /// Resolution-time warm-up; a failure is reported once to `sink`
    pub fn at_resolution<R>(&self, resolver: &R, sink: Option<&dyn DiagnosticSink>)
    where
        R: ServiceResolver + ?Sized,
    {
        if let Err(err) = self.try_at_resolution(resolver) {
            if let Some(sink) = sink {
                sink.report(&err, WARMUP_FAILURE_MESSAGE);
            }
        }
    }

    /// Resolution-time warm-up with the outcome exposed
    ///
    /// # Errors
    /// - [`ConfigurationError::NoContainerTypes`] when the registry is empty
    /// - [`ConfigurationError::NoCacheStore`] when the resolver has no store
    /// - [`PopulateError::Incomplete`] when any entry failed
    pub fn try_at_resolution<R>(&self, resolver: &R) -> Result<PopulateReport, PopulateError>
    where
        R: ServiceResolver + ?Sized,
    {
        let _span = info_span!("warmup", entry = "resolution").entered();
        if !self.config.enabled {
            return Ok(PopulateReport::default());
        }
        self.config.validate().map_err(ConfigurationError::from)?;

        let models = ContainerLocator::new(self.registry).all();
        if models.is_empty() {
            return Err(ConfigurationError::NoContainerTypes.into());
        }

        self.run(resolver, &models, false)
    }

    fn run<R>(
        &self,
        resolver: &R,
        models: &[&ContainerModel],
        quiet: bool,
    ) -> Result<PopulateReport, PopulateError>
    where
        R: ServiceResolver + ?Sized,
    {
        let cache = resolver.cache_store().ok_or(ConfigurationError::NoCacheStore)?;
        let mut scanner =
            MetadataScanner::new().with_default_expiration(self.config.default_expiration());
        let mut populator =
            CachePopulator::new(cache, resolver).with_failure_policy(self.config.failure_policy);
        if quiet {
            scanner = scanner.quiet();
            populator = populator.quiet();
        }
        if self.config.per_key_lock {
            populator = populator.with_key_locks(self.key_locks.clone());
        }

        let entries = scanner.scan_all(models.iter().copied());

        populator.populate(&entries)?.into_result()
    }
}

/// Registration-time warm-up as a method on service collections
pub trait RegistrationWarmupExt: ServiceRegistrations {
    /// Fill the cache from registered containers, swallowing every failure
    fn add_entities_into_memory_cache(&self, registry: &MetadataRegistry) {
        Warmup::new(registry).at_registration(self);
    }
}

impl<T: ServiceRegistrations + ?Sized> RegistrationWarmupExt for T {}

/// Resolution-time warm-up as a method on built resolvers
pub trait ResolutionWarmupExt: ServiceResolver {
    /// Fill the cache from every known container, reporting a failure to `sink`
    fn populate_memory_cache(
        &self,
        registry: &MetadataRegistry,
        sink: Option<&dyn DiagnosticSink>,
    ) {
        Warmup::new(registry).at_resolution(self, sink);
    }
}

impl<T: ServiceResolver + ?Sized> ResolutionWarmupExt for T {}
