//! Key/value transport underneath the snapshot cache

use crate::core::error::CacheError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Byte-level cache store
///
/// Implementations wrap a remote cache (Redis, Memcached, ...) or a local
/// map. Errors mean the transport itself failed, never that a key is absent.
#[async_trait]
pub trait CacheTransport: Send + Sync {
    /// Fetch a payload, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a payload until `expires_at`; returns whether it was written
    async fn set(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, CacheError>;

    /// Remove a payload; returns whether a key was removed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// One stored snapshot
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Process-local transport
#[derive(Clone, Default)]
pub struct InMemoryCacheTransport {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCacheTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheTransport for InMemoryCacheTransport {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Utc::now();
        {
            let entries = self
                .entries
                .read()
                .map_err(|e| CacheError::Unavailable(format!("Failed to acquire read lock: {}", e)))?;

            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.payload.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        payload: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, CacheError> {
        if expires_at <= Utc::now() {
            return Ok(false);
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                payload,
                expires_at,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;
        Ok(entries.remove(key).is_some())
    }
}
