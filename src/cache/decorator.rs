//! Cache-aside decorator for repositories

use super::service::CacheService;
use crate::core::{
    Entity, InMemoryQuery, PaginatedResponse, Queryable, Repository, Specification,
    SpecificationEvaluator,
};
use anyhow::Result;
use async_trait::async_trait;
use std::marker::PhantomData;
use uuid::Uuid;

/// Repository serving reads from a cached snapshot of the whole collection
///
/// Reads consult the snapshot first. A missing snapshot is repopulated by
/// `list` only; `get` and `find` fall through to the wrapped repository
/// without populating. Every successful write invalidates the snapshot for
/// the type. Cache failures never fail a request.
pub struct CachedRepository<T, R> {
    inner: R,
    cache: CacheService,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: Repository<T>> CachedRepository<T, R> {
    pub fn new(inner: R, cache: CacheService) -> Self {
        Self {
            inner,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    async fn snapshot(&self) -> Option<Vec<T>> {
        match self.cache.get_snapshot::<T>().await {
            Ok(Some(snapshot)) => {
                tracing::debug!(
                    entity_type = T::type_name(),
                    count = snapshot.len(),
                    "Serving from cached snapshot"
                );
                Some(snapshot)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    entity_type = T::type_name(),
                    error = %e,
                    "Cache read failed, falling back to data source"
                );
                None
            }
        }
    }

    async fn invalidate(&self) {
        match self.cache.invalidate::<T>().await {
            Ok(removed) => {
                tracing::debug!(entity_type = T::type_name(), removed, "Cache invalidated");
            }
            Err(e) => {
                tracing::warn!(
                    entity_type = T::type_name(),
                    error = %e,
                    "Cache invalidation failed"
                );
            }
        }
    }
}

#[async_trait]
impl<T: Entity, R: Repository<T>> Repository<T> for CachedRepository<T, R> {
    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        if let Some(snapshot) = self.snapshot().await {
            return Ok(snapshot.into_iter().find(|entity| entity.id() == *id));
        }
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<T>> {
        if let Some(snapshot) = self.snapshot().await {
            return Ok(snapshot);
        }

        let entities = self.inner.list().await?;
        match self.cache.store_snapshot(&entities).await {
            Ok(stored) => {
                tracing::debug!(
                    entity_type = T::type_name(),
                    count = entities.len(),
                    stored,
                    "Cache populated"
                );
            }
            Err(e) => {
                tracing::warn!(
                    entity_type = T::type_name(),
                    error = %e,
                    "Cache population failed"
                );
            }
        }
        Ok(entities)
    }

    async fn find(&self, spec: Specification<T>) -> Result<Vec<T>> {
        match self.snapshot().await {
            Some(snapshot) => {
                let source = InMemoryQuery::new(snapshot);
                Ok(SpecificationEvaluator::apply(source, spec).into_vec())
            }
            None => self.inner.find(spec).await,
        }
    }

    async fn find_page(&self, spec: Specification<T>) -> Result<PaginatedResponse<T>> {
        match self.snapshot().await {
            Some(snapshot) => Ok(SpecificationEvaluator::evaluate_page(
                InMemoryQuery::new(snapshot),
                spec,
            )),
            None => self.inner.find_page(spec).await,
        }
    }

    async fn create(&self, entity: T) -> Result<T> {
        let created = self.inner.create(entity).await?;
        self.invalidate().await;
        Ok(created)
    }

    async fn update(&self, id: &Uuid, entity: T) -> Result<T> {
        let updated = self.inner.update(id, entity).await?;
        self.invalidate().await;
        Ok(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        self.inner.delete(id).await?;
        self.invalidate().await;
        Ok(())
    }
}
