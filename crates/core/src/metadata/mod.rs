//! Static metadata describing containers and their cacheable collections
//!
//! Containers opt in by implementing [`ContainerMetadata`], usually through
//! the [`container_model!`](crate::container_model) macro, and are collected
//! into a [`MetadataRegistry`] the locator and scanner work from.

mod model;
mod registry;

pub use model::{ContainerMetadata, ContainerModel, ContainerModelBuilder, MemberModel};
pub use registry::MetadataRegistry;
