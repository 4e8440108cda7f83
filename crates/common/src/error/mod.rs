//! Error primitives shared by the CacheStorm crates
//!
//! Crate-specific errors embed [`CommonError`] for the failures every layer
//! can hit (bad configuration, unreadable payloads, missing resources) and
//! implement [`ErrorClassification`] so entry points and diagnostic sinks can
//! decide how loudly to report without matching on concrete types.
//!
//! ```rust,ignore
//! #[derive(Debug, Error)]
//! pub enum LoaderError {
//!     #[error("Config directory is not readable: {0}")]
//!     Unreadable(PathBuf),
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//!
//! impl_error_classification!(LoaderError, Common,
//!     LoaderError::Unreadable(_) => { retryable: true, severity: ErrorSeverity::Error }
//! );
//! ```
//!
//! | Severity | Warm-up meaning |
//! |----------|-----------------|
//! | `Info` | Nothing to do: no config file, key already cached |
//! | `Warning` | One collection failed, the rest of the pass is usable |
//! | `Error` | The pass could not run: missing store, invalid config |
//! | `Critical` | Metadata disagrees with the live container graph |

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Failures that are not specific to one crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// A configuration value or source is unusable
    Config { message: String, field: Option<String> },

    /// A payload could not be decoded
    Serialization { format: &'static str, message: String },

    /// Something expected to exist is absent
    NotFound { resource: String, identifier: Option<String> },

    /// Invariant violation inside the process
    Internal { message: String },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field: Some(field) } => {
                write!(f, "Configuration error in field '{field}': {message}")
            }
            Self::Config { message, field: None } => write!(f, "Configuration error: {message}"),
            Self::Serialization { format, message } => {
                write!(f, "Invalid {format} payload: {message}")
            }
            Self::NotFound { resource, identifier: Some(id) } => {
                write!(f, "{resource} not found: '{id}'")
            }
            Self::NotFound { resource, identifier: None } => write!(f, "{resource} not found"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        false
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::Config { .. } | Self::Serialization { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }
}

impl CommonError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Configuration error attributed to one field or environment variable
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    pub fn serialization(format: &'static str, message: impl Into<String>) -> Self {
        Self::Serialization { format, message: message.into() }
    }

    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        Self::NotFound { resource: resource.into(), identifier: None }
    }

    pub fn not_found_with_id<T: Into<String>, I: Into<String>>(resource: T, identifier: I) -> Self {
        Self::NotFound { resource: resource.into(), identifier: Some(identifier.into()) }
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err.to_string())
    }
}

/// Retryability and severity of an error
///
/// Only the first two methods are required. Criticality follows from the
/// severity, and no retry delay is suggested unless an implementation
/// overrides `retry_after`.
pub trait ErrorClassification {
    /// Whether running the same operation again may succeed
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Ordered severity scale, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        })
    }
}

/// Implements [`ErrorClassification`] for an enum that wraps `CommonError`
///
/// The wrapping variant delegates; every other variant lists its
/// retryability and severity.
///
/// ```rust,ignore
/// impl_error_classification!(InfraError, Common,
///     InfraError::Io { .. } => { retryable: true, severity: ErrorSeverity::Error },
/// );
/// ```
#[macro_export]
macro_rules! impl_error_classification {
    (
        $error_type:ty,
        $common_variant:ident
        $(,
            $variant:pat => {
                retryable: $retryable:expr,
                severity: $severity:expr
                $(,)?
            }
        )*
        $(,)?
    ) => {
        impl $crate::error::ErrorClassification for $error_type {
            fn is_retryable(&self) -> bool {
                match self {
                    Self::$common_variant(e) => {
                        $crate::error::ErrorClassification::is_retryable(e)
                    }
                    $($variant => $retryable,)*
                }
            }

            fn severity(&self) -> $crate::error::ErrorSeverity {
                match self {
                    Self::$common_variant(e) => $crate::error::ErrorClassification::severity(e),
                    $($variant => $severity,)*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates display formatting of configuration errors.
    ///
    /// Assertions:
    /// - Field-scoped errors name the field.
    /// - Unscoped errors carry only the message.
    #[test]
    fn test_config_display() {
        let err = CommonError::config_field("CACHESTORM_FAILURE_POLICY", "unknown value");
        assert_eq!(
            err.to_string(),
            "Configuration error in field 'CACHESTORM_FAILURE_POLICY': unknown value"
        );
        assert_eq!(CommonError::config("empty").to_string(), "Configuration error: empty");
    }

    /// Validates the severity mapping and the trait defaults.
    ///
    /// Assertions:
    /// - Missing resources are informational.
    /// - Internal errors are critical through the default `is_critical`.
    /// - Nothing suggests a retry delay.
    #[test]
    fn test_classification() {
        let missing = CommonError::not_found_with_id("config file", "cachestorm.toml");
        assert_eq!(missing.severity(), ErrorSeverity::Info);
        assert_eq!(missing.to_string(), "config file not found: 'cachestorm.toml'");
        assert!(!missing.is_retryable());

        let internal = CommonError::internal("subscriber already set");
        assert!(internal.is_critical());
        assert!(internal.retry_after().is_none());
    }

    #[test]
    fn test_json_errors_convert_to_serialization() {
        let err: CommonError =
            serde_json::from_str::<serde_json::Value>("{ \"enabled\": ").unwrap_err().into();
        assert!(matches!(err, CommonError::Serialization { format: "JSON", .. }));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
