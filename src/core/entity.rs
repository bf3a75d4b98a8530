//! Entity trait defining the core abstraction for all listing data types

use crate::core::reflect::Reflect;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all entities in the system.
///
/// All entities have:
/// - id: Unique identifier
/// - created_at / updated_at: Timestamps managed by the entity itself
/// - deleted_at: Soft deletion timestamp (optional)
///
/// Entities are serializable so that whole collections can be stored in the
/// cache, and reflectable so that filters can address their fields.
pub trait Entity: Reflect + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The entity type name (e.g. "property"); also the cache key
    fn type_name() -> &'static str;

    /// The plural resource name used in URLs (e.g. "properties")
    fn resource_name() -> &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Mark the entity as soft-deleted
    fn soft_delete(&mut self);

    /// Refresh the update timestamp
    fn touch(&mut self);

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Conversion from a REST request body into an entity
pub trait EntityPayload: Entity {
    type Payload: DeserializeOwned + Send + 'static;

    /// Build a fresh entity from a create body
    fn create_from(payload: Self::Payload) -> Self;

    /// Apply an update body to an existing entity
    fn update_from(&mut self, payload: Self::Payload);
}
