//! Data source implementations

pub mod in_memory;
pub mod relation;

pub use in_memory::InMemoryRepository;
pub use relation::{RelationLoader, RepositoryRelation};
