//! # estate-rs
//!
//! Core of a property-listing API: a dynamic filter/specification engine
//! and a cache-aside repository decorator, exposed over REST.
//!
//! ## Features
//!
//! - **Wire-level filters**: field path, operator code and literal value
//!   compiled into a typed predicate over any reflectable entity
//! - **Specifications**: filter, multi-key ordering, includes and paging
//!   bundled and evaluated against any [`Queryable`](core::Queryable) source
//! - **Snapshot cache**: whole-collection cache per entity type, invalidated
//!   on every write
//! - **Soft delete**: deleted entities stay stored but are never returned
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use estate::prelude::*;
//!
//! let request = QueryFilterRequest::new()
//!     .filter("Price", ComparisonOperator::GreaterThan, "500000")
//!     .filter("Owner.Name", ComparisonOperator::StartsWith, "A")
//!     .sort_by("Price", SortDirection::Descending, 0)
//!     .page(0, 10);
//!
//! let spec = Specification::<Property>::from_request(&request).build();
//! let page = repository.find_page(spec).await?;
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`)
///
/// Calling it more than once is harmless; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Engine ===
    pub use crate::core::{
        CompiledFilter, ComparisonOperator, FieldAccessor, FieldPathResolver, FieldType,
        FieldValue, FilterCompiler, FilterDescriptor, LogicalOperator, OperatorCode,
        OperatorCompiler, Predicate, QueryFilterRequest, SortDescriptor, SortDirection,
        Specification, SpecificationBuilder, SpecificationEvaluator,
    };

    // === Traits ===
    pub use crate::core::{Entity, EntityPayload, Queryable, Reflect, Repository};

    // === Results ===
    pub use crate::core::{InMemoryQuery, PaginatedResponse, PaginationMeta};

    // === Errors ===
    pub use crate::core::{CacheError, EntityError, EstateError, EstateResult, QueryError};

    // === Macros ===
    pub use crate::{impl_entity, impl_reflect};

    // === Cache ===
    pub use crate::cache::{CacheService, CacheTransport, CachedRepository, InMemoryCacheTransport};

    // === Storage ===
    pub use crate::storage::{InMemoryRepository, RelationLoader, RepositoryRelation};

    // === Entities ===
    pub use crate::entities::{Owner, Property};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, RestResource, ServerBuilder};

    // === Config ===
    pub use crate::config::{CacheConfig, EstateConfig, PagingConfig};

    // === Re-exports from dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_tracing_is_idempotent() {
        super::init_tracing();
        super::init_tracing();
        tracing::info!("tracing initialised");
    }
}
