//! Repository trait for entity data sources

use crate::core::entity::Entity;
use crate::core::query::PaginatedResponse;
use crate::core::specification::Specification;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Data source for one entity type
///
/// Implementations provide CRUD operations plus evaluation of a
/// [`Specification`]. Soft-deleted entities are invisible to every read.
/// Errors carry typed causes ([`EntityError`](crate::core::error::EntityError),
/// [`StorageError`](crate::core::error::StorageError)) inside `anyhow::Error`.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Get a single entity by ID
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all non-deleted entities
    async fn list(&self) -> Result<Vec<T>>;

    /// Evaluate a specification against the source
    async fn find(&self, spec: Specification<T>) -> Result<Vec<T>>;

    /// Evaluate a specification and report the filtered total
    async fn find_page(&self, spec: Specification<T>) -> Result<PaginatedResponse<T>>;

    async fn create(&self, entity: T) -> Result<T>;

    /// Replace an existing entity
    async fn update(&self, id: &Uuid, entity: T) -> Result<T>;

    /// Soft-delete an entity
    async fn delete(&self, id: &Uuid) -> Result<()>;
}
