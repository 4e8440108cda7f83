//! Domain constants

use std::time::Duration;

/// Expiration applied to a policy declared with a key only (30 minutes)
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(DEFAULT_EXPIRATION_SECS);

/// [`DEFAULT_EXPIRATION`] in whole seconds, as it appears in configuration
pub const DEFAULT_EXPIRATION_SECS: u64 = 30 * 60;

/// Message reported to the diagnostic sink when a resolution-time pass fails
pub const WARMUP_FAILURE_MESSAGE: &str =
    "Exception was thrown during the process of adding entities into memory cache.";
