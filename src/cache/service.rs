//! Snapshot cache keyed by entity type name

use super::transport::CacheTransport;
use crate::config::CacheConfig;
use crate::core::Entity;
use crate::core::error::CacheError;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Stores and retrieves full unfiltered collections, one per entity type
///
/// The service is a plain value handed to each cached repository; several
/// repositories may share one transport since keys are type names.
#[derive(Clone)]
pub struct CacheService {
    transport: Arc<dyn CacheTransport>,
    ttl: Duration,
    enabled: bool,
}

impl CacheService {
    pub fn new(transport: Arc<dyn CacheTransport>, ttl: Duration) -> Self {
        Self {
            transport,
            ttl,
            enabled: true,
        }
    }

    pub fn from_config(transport: Arc<dyn CacheTransport>, config: &CacheConfig) -> Self {
        let ttl = i64::try_from(config.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            transport,
            ttl,
            enabled: config.enabled,
        }
    }

    /// A service that never stores anything
    pub fn disabled(transport: Arc<dyn CacheTransport>) -> Self {
        Self {
            transport,
            ttl: Duration::zero(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Read the snapshot for `T`, `None` on a miss
    pub async fn get_snapshot<T: Entity>(&self) -> Result<Option<Vec<T>>, CacheError> {
        if !self.enabled {
            return Ok(None);
        }

        let key = T::type_name();
        let Some(payload) = self.transport.get(key).await? else {
            return Ok(None);
        };

        let snapshot = serde_json::from_slice(&payload).map_err(|source| {
            CacheError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(snapshot))
    }

    /// Store the snapshot for `T` until now + ttl
    pub async fn store_snapshot<T: Entity>(&self, entities: &[T]) -> Result<bool, CacheError> {
        if !self.enabled {
            return Ok(false);
        }

        let key = T::type_name();
        let payload = serde_json::to_vec(entities).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })?;
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);

        self.transport.set(key, payload, expires_at).await
    }

    /// Drop the snapshot for `T`
    pub async fn invalidate<T: Entity>(&self) -> Result<bool, CacheError> {
        if !self.enabled {
            return Ok(false);
        }
        self.transport.delete(T::type_name()).await
    }
}
