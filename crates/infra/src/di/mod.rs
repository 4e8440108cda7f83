//! Minimal service container with singleton, scoped and transient lifetimes
//!
//! [`ServiceCollection`] is the registration surface the registration-time
//! warm-up runs against; [`ServiceProvider`] is the built resolver the
//! resolution-time warm-up runs against.

mod collection;
mod provider;

pub use collection::{Lifetime, ServiceCollection};
pub use provider::{ServiceProvider, ServiceScope};
