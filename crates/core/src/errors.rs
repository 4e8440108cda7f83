//! Error taxonomy for the warm-up engine
//!
//! | Error | Raised when | Scope |
//! |-------|-------------|-------|
//! | [`ConfigurationError`] | no container types, no cache store, bad config | whole pass |
//! | [`MaterializationError`] | resolving, accessing or enumerating one collection | one entry |
//! | [`PolicyError`] | a declared marker fails validation | one member, skipped |
//! | [`PopulateError::Incomplete`] | a continue-on-failure pass had failing entries | whole pass |
//!
//! [`PolicyError`]: cachestorm_domain::PolicyError

use cachestorm_common::error::{ErrorClassification, ErrorSeverity};
use cachestorm_domain::InvalidConfig;
use thiserror::Error;

/// Failure reported by a data context or its collections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataError {
    message: String,
}

impl DataError {
    /// Wrap a data-source message
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// The underlying message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure to produce a service instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Service '{type_name}' is not registered")]
    NotRegistered { type_name: &'static str },

    #[error("Failed to construct service '{type_name}': {message}")]
    Construction { type_name: &'static str, message: String },

    #[error("Service scope could not be created: {0}")]
    Scope(String),
}

/// Preconditions of a populate pass that do not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("No eligible container types were found")]
    NoContainerTypes,

    #[error("No cache store is registered")]
    NoCacheStore,

    #[error(transparent)]
    Invalid(#[from] InvalidConfig),
}

/// Failure to materialize one (container, entity) collection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializationError {
    #[error("Container '{container}' could not be resolved: {source}")]
    ContainerUnavailable { container: &'static str, source: ResolveError },

    #[error("Resolved instance is not a '{container}'")]
    ContainerTypeMismatch { container: &'static str },

    #[error("Collection accessor for '{entity}' on '{container}' failed: {source}")]
    Accessor { container: &'static str, entity: &'static str, source: DataError },

    #[error("Enumerating '{entity}' on '{container}' failed: {source}")]
    Enumeration { container: &'static str, entity: &'static str, source: DataError },
}

/// One entry that failed during a continue-on-failure pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub key: String,
    pub container: &'static str,
    pub member: &'static str,
    pub error: MaterializationError,
}

/// Top-level error of a populate pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulateError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("{} of {total} cache entries failed to populate", .failures.len())]
    Incomplete { failures: Vec<EntryFailure>, total: usize },
}

/// Result alias for populate passes
pub type PopulateResult<T> = Result<T, PopulateError>;

impl ErrorClassification for MaterializationError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Accessor { .. } | Self::Enumeration { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ContainerTypeMismatch { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Warning,
        }
    }
}

impl ErrorClassification for PopulateError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Materialization(err) => err.is_retryable(),
            Self::Incomplete { failures, .. } => failures.iter().all(|f| f.error.is_retryable()),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Configuration(_) | Self::Resolve(_) => ErrorSeverity::Error,
            Self::Materialization(err) => err.severity(),
            Self::Incomplete { failures, .. } => failures
                .iter()
                .map(|f| f.error.severity())
                .max()
                .unwrap_or(ErrorSeverity::Warning),
        }
    }
}
