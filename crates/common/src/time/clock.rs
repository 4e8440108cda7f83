//! Monotonic clocks for expiry checks
//!
//! Cache entries record the instant they expire at. Production code reads
//! [`SystemClock`]; tests drive a [`MockClock`] forward instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;

    /// Instant at which something stored now with `ttl` expires
    ///
    /// Saturates to `None` when the deadline cannot be represented, which
    /// callers treat as "never expires".
    fn deadline(&self, ttl: Duration) -> Option<Instant> {
        self.now().checked_add(ttl)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock
///
/// Clones share one offset, so a test hands a clone to the cache and moves
/// time through its own handle.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self { origin: Instant::now(), offset_nanos: Arc::new(AtomicU64::new(0)) }
    }

    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Total time advanced since creation
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
