//! HTTP exposure of the registered entity types
//!
//! `ServerBuilder` mounts, per entity type:
//! - CRUD routes (`/{plural}`, `/{plural}/{id}`)
//! - the filter endpoint (`POST /{plural}/query`)
//!
//! plus `/health`.

pub mod builder;
pub mod entity_registry;
pub mod rest;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry, RestResource};
pub use rest::EntityState;
