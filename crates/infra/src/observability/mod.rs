//! Tracing subscriber setup
//!
//! The engine only emits `tracing` events; hosts decide where they go. This
//! module wires the usual fmt subscriber with an `EnvFilter` so `RUST_LOG`
//! can override the default directives.

use cachestorm_common::CommonError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::errors::InfraResult;

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Default filter directives for the CacheStorm crates
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "cachestorm_core=debug,cachestorm_infra=debug,info"
    } else {
        "cachestorm_core=info,cachestorm_infra=info,warn"
    }
}

/// Install a global pretty subscriber
///
/// # Errors
/// Returns `Internal` if a global subscriber is already set.
pub fn init_tracing(verbose: bool) -> InfraResult<()> {
    init_tracing_with(LogFormat::Pretty, verbose)
}

/// Install a global subscriber with the given format
///
/// # Errors
/// Returns `Internal` if a global subscriber is already set.
pub fn init_tracing_with(format: LogFormat, verbose: bool) -> InfraResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Pretty => {
            registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init()
        }
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    };

    result.map_err(|e| CommonError::internal(format!("Failed to init subscriber: {e}")))?;
    tracing::debug!(?format, verbose, "Tracing initialized");
    Ok(())
}
