//! In-memory repository for testing and development

use super::relation::RelationLoader;
use crate::core::error::{EntityError, StorageError};
use crate::core::reflect::segment_matches;
use crate::core::{
    Entity, InMemoryQuery, PaginatedResponse, Queryable, Repository, Specification,
    SpecificationEvaluator,
};
use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

const BACKEND: &str = "in-memory";

/// In-memory repository implementation
///
/// Entities are kept in insertion order, which is also the order of an
/// unsorted listing. Deletes are soft: the entity stays in the map with
/// `deleted_at` set and is skipped by every read.
///
/// Relations are filled by the registered [`RelationLoader`]s: `get` and
/// `list` load all of them, `find` and `find_page` only those the
/// specification includes.
#[derive(Clone)]
pub struct InMemoryRepository<T> {
    entities: Arc<RwLock<IndexMap<Uuid, T>>>,
    relations: Vec<Arc<dyn RelationLoader<T>>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    /// Create a repository pre-populated with entities
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let map = entities.into_iter().map(|e| (e.id(), e)).collect();
        Self {
            entities: Arc::new(RwLock::new(map)),
            relations: Vec::new(),
        }
    }

    /// Register a loader for one relation of `T`
    pub fn with_relation(mut self, loader: impl RelationLoader<T> + 'static) -> Self {
        self.relations.push(Arc::new(loader));
        self
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<Uuid, T>>> {
        self.entities.read().map_err(|e| {
            StorageError::Unavailable {
                backend: BACKEND.to_string(),
                message: format!("Failed to acquire read lock: {}", e),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<Uuid, T>>> {
        self.entities.write().map_err(|e| {
            StorageError::Unavailable {
                backend: BACKEND.to_string(),
                message: format!("Failed to acquire write lock: {}", e),
            }
            .into()
        })
    }

    fn live(&self) -> Result<Vec<T>> {
        let entities = self.read()?;
        Ok(entities
            .values()
            .filter(|entity| !entity.is_deleted())
            .cloned()
            .collect())
    }

    fn live_one(&self, id: &Uuid) -> Result<Option<T>> {
        let entities = self.read()?;
        Ok(entities.get(id).filter(|e| !e.is_deleted()).cloned())
    }

    async fn load_all(&self, entities: &mut [T]) -> Result<()> {
        for loader in &self.relations {
            loader.load(entities).await?;
        }
        Ok(())
    }

    async fn load_included(&self, entities: &mut [T], includes: &[String]) -> Result<()> {
        for include in includes {
            let loader = self
                .relations
                .iter()
                .find(|loader| segment_matches(loader.relation(), include));
            match loader {
                Some(loader) => loader.load(entities).await?,
                None => tracing::debug!(
                    entity_type = T::type_name(),
                    relation = %include,
                    "No loader registered, keeping embedded relation"
                ),
            }
        }
        Ok(())
    }

    async fn source_for(&self, spec: &Specification<T>) -> Result<InMemoryQuery<T>> {
        let mut items = self.live()?;
        self.load_included(&mut items, spec.includes()).await?;
        Ok(InMemoryQuery::new(items))
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let Some(entity) = self.live_one(id)? else {
            return Ok(None);
        };
        let mut loaded = [entity];
        self.load_all(&mut loaded).await?;
        let [entity] = loaded;
        Ok(Some(entity))
    }

    async fn list(&self) -> Result<Vec<T>> {
        let mut items = self.live()?;
        self.load_all(&mut items).await?;
        Ok(items)
    }

    async fn find(&self, spec: Specification<T>) -> Result<Vec<T>> {
        let source = self.source_for(&spec).await?;
        Ok(SpecificationEvaluator::apply(source, spec).into_vec())
    }

    async fn find_page(&self, spec: Specification<T>) -> Result<PaginatedResponse<T>> {
        let source = self.source_for(&spec).await?;
        Ok(SpecificationEvaluator::evaluate_page(source, spec))
    }

    async fn create(&self, entity: T) -> Result<T> {
        let mut entities = self.write()?;

        let id = entity.id();
        if entities.contains_key(&id) {
            return Err(EntityError::AlreadyExists {
                entity_type: T::type_name().to_string(),
                id,
            }
            .into());
        }

        entities.insert(id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: &Uuid, mut entity: T) -> Result<T> {
        let mut entities = self.write()?;

        if !entities.get(id).is_some_and(|e| !e.is_deleted()) {
            return Err(EntityError::not_found(T::type_name(), *id).into());
        }

        entity.touch();
        entities.insert(*id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut entities = self.write()?;

        let entity = entities
            .get_mut(id)
            .filter(|e| !e.is_deleted())
            .ok_or_else(|| EntityError::not_found(T::type_name(), *id))?;
        entity.soft_delete();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ComparisonOperator, QueryFilterRequest, SortDirection};
    use crate::entities::{Owner, Property};

    fn listings() -> Vec<Property> {
        vec![
            Property::new("Parkview", "1 Elm St", "Springfield", 400000.0, 2),
            Property::new("Lakeside", "2 Lake Rd", "Shelbyville", 600000.0, 3),
            Property::new("Parkside", "3 Oak Ave", "Springfield", 900000.0, 4),
        ]
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryRepository::new();
        let property = Property::new("Parkview", "1 Elm St", "Springfield", 400000.0, 2);

        let created = repo.create(property.clone()).await.unwrap();
        assert_eq!(created.id, property.id);

        let fetched = repo.get(&property.id).await.unwrap();
        assert_eq!(fetched, Some(property));
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let property = Property::new("Parkview", "1 Elm St", "Springfield", 400000.0, 2);
        let repo = InMemoryRepository::with_entities(vec![property.clone()]);

        let err = repo.create(property).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EntityError>(),
            Some(EntityError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let items = listings();
        let id = items[0].id;
        let repo = InMemoryRepository::with_entities(items);

        repo.delete(&id).await.unwrap();

        assert!(repo.get(&id).await.unwrap().is_none());
        assert_eq!(repo.list().await.unwrap().len(), 2);

        let err = repo.delete(&id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EntityError>(),
            Some(EntityError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_and_touches() {
        let items = listings();
        let mut changed = items[1].clone();
        let before = changed.updated_at;
        changed.price = 650000.0;
        let repo = InMemoryRepository::with_entities(items);

        let updated = repo.update(&changed.id, changed.clone()).await.unwrap();
        assert_eq!(updated.price, 650000.0);
        assert!(updated.updated_at >= before);
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let repo = InMemoryRepository::<Property>::new();
        let property = Property::new("Parkview", "1 Elm St", "Springfield", 400000.0, 2);

        let err = repo.update(&property.id, property.clone()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EntityError>(),
            Some(EntityError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_applies_specification() {
        let repo = InMemoryRepository::with_entities(listings());
        let request = QueryFilterRequest::new()
            .filter("City", ComparisonOperator::Equal, "Springfield")
            .sort_by("Price", SortDirection::Descending, 0);
        let spec = Specification::from_request(&request).build();

        let found = repo.find(spec).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Parkside", "Parkview"]);
    }

    #[tokio::test]
    async fn test_find_page_skips_deleted() {
        let items = listings();
        let deleted = items[2].id;
        let repo = InMemoryRepository::with_entities(items);
        repo.delete(&deleted).await.unwrap();

        let request = QueryFilterRequest::new().page(0, 1);
        let page = repo
            .find_page(Specification::from_request(&request).build())
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.total, 2);
        assert!(page.pagination.has_next);
    }

    #[tokio::test]
    async fn test_find_loads_relation_crossed_by_filter() {
        let ada = Owner::new("Ada", "ada@example.com");
        let grace = Owner::new("Grace", "grace@example.com");
        let owners = InMemoryRepository::with_entities(vec![ada.clone(), grace.clone()]);

        let mut items = listings();
        items[0].owner_id = Some(ada.id);
        items[1].owner_id = Some(grace.id);
        let repo =
            InMemoryRepository::with_entities(items).with_relation(Property::owner_relation(owners));

        let request =
            QueryFilterRequest::new().filter("Owner.Name", ComparisonOperator::Equal, "Ada");
        let found = repo
            .find(Specification::from_request(&request).build())
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Parkview");
        assert_eq!(found[0].owner.as_ref().map(|o| o.id), Some(ada.id));
    }

    #[tokio::test]
    async fn test_get_and_list_load_relations() {
        let ada = Owner::new("Ada", "ada@example.com");
        let owners = InMemoryRepository::with_entities(vec![ada.clone()]);

        let mut property = Property::new("Parkview", "1 Elm St", "Springfield", 1.0, 1);
        property.owner_id = Some(ada.id);
        let repo = InMemoryRepository::with_entities(vec![property.clone()])
            .with_relation(Property::owner_relation(owners));

        let fetched = repo.get(&property.id).await.unwrap().unwrap();
        assert_eq!(fetched.owner, Some(ada.clone()));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].owner, Some(ada));
    }

    #[tokio::test]
    async fn test_find_without_include_leaves_relation_unloaded() {
        let ada = Owner::new("Ada", "ada@example.com");
        let owners = InMemoryRepository::with_entities(vec![ada.clone()]);

        let mut property = Property::new("Parkview", "1 Elm St", "Springfield", 1.0, 1);
        property.owner_id = Some(ada.id);
        let repo = InMemoryRepository::with_entities(vec![property])
            .with_relation(Property::owner_relation(owners));

        let found = repo
            .find(Specification::<Property>::builder().build())
            .await
            .unwrap();
        assert!(found[0].owner.is_none());
    }
}
