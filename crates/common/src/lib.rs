//! Building blocks shared by the CacheStorm crates
//!
//! Nothing is compiled by default. `foundation` brings the error
//! classification and clocks that every layer depends on. `runtime` adds the
//! stateful pieces used by the populator and the memory store: the TTL cache
//! and per-key locks.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod time;

#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod sync;

#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
