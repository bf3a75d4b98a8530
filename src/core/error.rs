//! Typed error handling for estate-rs
//!
//! # Error Categories
//!
//! - [`QueryError`]: filter, sort and operator compilation failures
//! - [`EntityError`]: entity CRUD failures
//! - [`CacheError`]: cache transport and payload failures
//! - [`StorageError`]: data source failures
//! - [`ConfigError`]: configuration loading failures
//!
//! Query compilation errors are normally recovered inside the engine (the
//! offending filter is dropped). The top-level [`EstateError`] is what REST
//! handlers return; it maps every category to an HTTP status and a JSON body.
//!
//! # Example
//!
//! ```rust,ignore
//! match result {
//!     Err(EstateError::Entity(EntityError::NotFound { id, .. })) => {
//!         println!("Listing {} not found", id);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//!     Ok(listing) => println!("Found: {:?}", listing),
//! }
//! ```

use crate::core::field::FieldType;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for estate-rs
#[derive(Debug)]
pub enum EstateError {
    /// Filter/sort compilation errors surfaced to the caller
    Query(QueryError),

    /// Entity-related errors (CRUD operations)
    Entity(EntityError),

    /// Cache errors that could not be recovered locally
    Cache(CacheError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Invalid request input (malformed id, body, ...)
    BadRequest(String),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for EstateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstateError::Query(e) => write!(f, "{}", e),
            EstateError::Entity(e) => write!(f, "{}", e),
            EstateError::Cache(e) => write!(f, "{}", e),
            EstateError::Storage(e) => write!(f, "{}", e),
            EstateError::Config(e) => write!(f, "{}", e),
            EstateError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            EstateError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for EstateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstateError::Query(e) => Some(e),
            EstateError::Entity(e) => Some(e),
            EstateError::Cache(e) => Some(e),
            EstateError::Storage(e) => Some(e),
            EstateError::Config(e) => Some(e),
            EstateError::BadRequest(_) | EstateError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl EstateError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EstateError::Query(e) => e.status_code(),
            EstateError::Entity(e) => e.status_code(),
            EstateError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            EstateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EstateError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EstateError::BadRequest(_) => StatusCode::BAD_REQUEST,
            EstateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EstateError::Query(e) => e.error_code(),
            EstateError::Entity(e) => e.error_code(),
            EstateError::Cache(_) => "CACHE_ERROR",
            EstateError::Storage(_) => "STORAGE_ERROR",
            EstateError::Config(_) => "CONFIG_ERROR",
            EstateError::BadRequest(_) => "BAD_REQUEST",
            EstateError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            EstateError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            EstateError::Query(QueryError::UnknownField {
                entity_type,
                segment,
            }) => Some(serde_json::json!({
                "entity_type": entity_type,
                "segment": segment
            })),
            EstateError::Query(QueryError::NoValidFilters { dropped }) => {
                Some(serde_json::json!({ "dropped": dropped }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for EstateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while compiling filters and sort keys
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A path segment does not exist on the entity (or related entity)
    #[error("unknown field '{segment}' on {entity_type}")]
    UnknownField {
        entity_type: String,
        segment: String,
    },

    /// The literal cannot be converted to the field's declared type
    #[error("cannot coerce '{value}' to {expected} for field '{field}'")]
    ValueCoercion {
        field: String,
        value: String,
        expected: FieldType,
    },

    /// A relational operator was used on a field without a natural order
    #[error("field '{field}' of type {field_type} does not support ordering comparisons")]
    UnorderableField { field: String, field_type: FieldType },

    /// The operator is outside the supported set
    #[error("operator '{operator}' is not supported")]
    NotSupported { operator: String },

    /// Every filter of the request was dropped
    #[error("none of the {dropped} filter(s) could be compiled")]
    NoValidFilters { dropped: usize },
}

impl QueryError {
    pub fn unknown_field(entity_type: impl Into<String>, segment: impl Into<String>) -> Self {
        QueryError::UnknownField {
            entity_type: entity_type.into(),
            segment: segment.into(),
        }
    }

    /// Unsupported operators point at a client/protocol bug rather than
    /// data the client could not know about
    pub fn is_fatal(&self) -> bool {
        matches!(self, QueryError::NotSupported { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            QueryError::NoValidFilters { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::UnknownField { .. } => "UNKNOWN_FIELD",
            QueryError::ValueCoercion { .. } => "VALUE_COERCION",
            QueryError::UnorderableField { .. } => "UNORDERABLE_FIELD",
            QueryError::NotSupported { .. } => "OPERATOR_NOT_SUPPORTED",
            QueryError::NoValidFilters { .. } => "NO_VALID_FILTERS",
        }
    }
}

impl From<QueryError> for EstateError {
    fn from(err: QueryError) -> Self {
        EstateError::Query(err)
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity operations
#[derive(Debug)]
pub enum EntityError {
    /// Entity was not found
    NotFound { entity_type: String, id: Uuid },

    /// Entity already exists (conflict)
    AlreadyExists { entity_type: String, id: Uuid },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::AlreadyExists { entity_type, id } => {
                write!(f, "{} with id '{}' already exists", entity_type, id)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn not_found(entity_type: impl Into<String>, id: Uuid) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.into(),
            id,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

impl From<EntityError> for EstateError {
    fn from(err: EntityError) -> Self {
        EstateError::Entity(err)
    }
}

// =============================================================================
// Cache Errors
// =============================================================================

/// Errors raised by the cache layer
///
/// The cache decorator never lets these fail a request: reads fall back to
/// the data source and invalidation failures are logged.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The transport could not be reached or refused the operation
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A cached payload could not be encoded or decoded
    #[error("cache payload for '{key}' is invalid: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<CacheError> for EstateError {
    fn from(err: CacheError) -> Self {
        EstateError::Cache(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to data sources
#[derive(Debug)]
pub enum StorageError {
    /// Lock poisoned or backend otherwise unusable
    Unavailable { backend: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { backend, message } => {
                write!(f, "Storage backend '{}' is unavailable: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for EstateError {
    fn from(err: StorageError) -> Self {
        EstateError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    IoError { path: String, message: String },

    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// A value is out of range
    InvalidValue { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError { path, message } => {
                write!(f, "Failed to read config file '{}': {}", path, message)
            }
            ConfigError::ParseError {
                file: Some(file),
                message,
            } => write!(f, "Failed to parse config file '{}': {}", file, message),
            ConfigError::ParseError { file: None, message } => {
                write!(f, "Failed to parse config: {}", message)
            }
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid config value for '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for EstateError {
    fn from(err: ConfigError) -> Self {
        EstateError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for EstateError {
    fn from(err: serde_yaml::Error) -> Self {
        EstateError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

/// Recover typed errors that travelled through `anyhow` service boundaries
impl From<anyhow::Error> for EstateError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<EstateError>() {
            Ok(e) => return e,
            Err(err) => err,
        };
        let err = match err.downcast::<EntityError>() {
            Ok(e) => return EstateError::Entity(e),
            Err(err) => err,
        };
        let err = match err.downcast::<QueryError>() {
            Ok(e) => return EstateError::Query(e),
            Err(err) => err,
        };
        let err = match err.downcast::<StorageError>() {
            Ok(e) => return EstateError::Storage(e),
            Err(err) => err,
        };
        EstateError::Internal(err.to_string())
    }
}

/// A specialized Result type for estate-rs operations
pub type EstateResult<T> = Result<T, EstateError>;
