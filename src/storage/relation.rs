//! Eager loading of relations for in-memory repositories

use crate::core::{Entity, Repository};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use uuid::Uuid;

/// Fills one relation on a batch of entities
#[async_trait]
pub trait RelationLoader<T>: Send + Sync {
    /// Declared relation name (e.g. "owner")
    fn relation(&self) -> &'static str;

    /// Load the relation for every entity in `entities`
    ///
    /// Entities whose key is unset, or points at a missing entity, get the
    /// relation cleared.
    async fn load(&self, entities: &mut [T]) -> Result<()>;
}

/// To-one relation resolved through the related type's repository
pub struct RepositoryRelation<T, R> {
    relation: &'static str,
    source: Arc<dyn Repository<R>>,
    key: fn(&T) -> Option<Uuid>,
    attach: fn(&mut T, Option<R>),
}

impl<T: Entity, R: Entity> RepositoryRelation<T, R> {
    pub fn new(
        relation: &'static str,
        source: impl Repository<R> + 'static,
        key: fn(&T) -> Option<Uuid>,
        attach: fn(&mut T, Option<R>),
    ) -> Self {
        Self {
            relation,
            source: Arc::new(source),
            key,
            attach,
        }
    }
}

#[async_trait]
impl<T: Entity, R: Entity> RelationLoader<T> for RepositoryRelation<T, R> {
    fn relation(&self) -> &'static str {
        self.relation
    }

    async fn load(&self, entities: &mut [T]) -> Result<()> {
        let mut loaded: HashMap<Uuid, Option<R>> = HashMap::new();
        for entity in entities.iter() {
            if let Some(id) = (self.key)(entity)
                && let Entry::Vacant(slot) = loaded.entry(id)
            {
                slot.insert(self.source.get(&id).await?);
            }
        }

        for entity in entities.iter_mut() {
            let related = (self.key)(entity).and_then(|id| loaded.get(&id).cloned().flatten());
            (self.attach)(entity, related);
        }

        tracing::trace!(
            entity_type = T::type_name(),
            relation = self.relation,
            distinct = loaded.len(),
            "Relation loaded"
        );
        Ok(())
    }
}
