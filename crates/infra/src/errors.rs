//! Infrastructure error type

use std::path::PathBuf;

use cachestorm_common::error::{CommonError, ErrorSeverity};
use cachestorm_common::impl_error_classification;
use cachestorm_domain::InvalidConfig;
use thiserror::Error;

/// Result alias for infrastructure operations
pub type InfraResult<T> = Result<T, InfraError>;

/// Errors raised by infrastructure adapters
#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),
}

impl_error_classification!(InfraError, Common,
    InfraError::Io { .. } => { retryable: true, severity: ErrorSeverity::Error },
    InfraError::InvalidConfig(_) => { retryable: false, severity: ErrorSeverity::Error },
);

impl InfraError {
    /// Whether the error means "nothing configured here" rather than "bad value"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Common(CommonError::NotFound { .. }))
    }
}
