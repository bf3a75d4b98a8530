//! Core module containing the filter/specification engine and the
//! fundamental traits of the framework

pub mod entity;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod filter;
pub mod operator;
pub mod predicate;
pub mod query;
pub mod reflect;
pub mod resolver;
pub mod service;
pub mod specification;
pub mod store;

pub use entity::{Entity, EntityPayload};
pub use error::{CacheError, EntityError, EstateError, EstateResult, QueryError, StorageError};
pub use evaluator::SpecificationEvaluator;
pub use field::{FieldType, FieldValue, ScalarField};
pub use filter::{CompiledFilter, FilterCompiler, SkippedFilter};
pub use operator::{Comparison, ComparisonOperator, ComparisonTest, OperatorCode, OperatorCompiler};
pub use predicate::Predicate;
pub use query::{
    FilterDescriptor, LogicalOperator, PaginatedResponse, PaginationMeta, QueryFilterRequest,
    SortDescriptor, SortDirection,
};
pub use reflect::{EntitySchema, FieldDef, FieldKind, Reflect};
pub use resolver::{FieldAccessor, FieldPathResolver};
pub use service::Repository;
pub use specification::{Paging, SortKey, Specification, SpecificationBuilder};
pub use store::{InMemoryQuery, Queryable};
