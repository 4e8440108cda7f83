//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock clocks used by TTL-aware components

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
