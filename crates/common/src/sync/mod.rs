//! Synchronization primitives
//!
//! - **[`key_lock`]**: per-key mutexes for serializing work on one cache key

pub mod key_lock;

pub use key_lock::KeyLocks;
