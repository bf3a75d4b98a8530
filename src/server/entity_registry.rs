//! Registry of exposed entity types and their REST routes

use super::rest::{
    EntityState, create_entity, delete_entity, get_entity, list_entities, query_entities,
    update_entity,
};
use crate::config::PagingConfig;
use crate::core::{EntityPayload, Repository};
use axum::{
    Router,
    routing::{get, post},
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Something that can mount the routes of one entity type
pub trait EntityDescriptor: Send + Sync {
    /// Singular type name, e.g. "property"
    fn entity_type(&self) -> &str;

    /// Plural resource name used as the path prefix, e.g. "properties"
    fn plural(&self) -> &str;

    fn build_routes(&self) -> Router;
}

/// Generic REST resource over a repository
///
/// Mounts `GET|POST /{plural}`, `POST /{plural}/query` and
/// `GET|PUT|DELETE /{plural}/{id}`.
pub struct RestResource<T: EntityPayload> {
    state: EntityState<T>,
}

impl<T: EntityPayload> RestResource<T> {
    pub fn new(repository: Arc<dyn Repository<T>>, paging: PagingConfig) -> Self {
        Self {
            state: EntityState { repository, paging },
        }
    }
}

impl<T: EntityPayload> EntityDescriptor for RestResource<T> {
    fn entity_type(&self) -> &str {
        T::type_name()
    }

    fn plural(&self) -> &str {
        T::resource_name()
    }

    fn build_routes(&self) -> Router {
        let collection = format!("/{}", T::resource_name());
        let query = format!("/{}/query", T::resource_name());
        let item = format!("/{}/{{id}}", T::resource_name());

        Router::new()
            .route(&collection, get(list_entities::<T>).post(create_entity::<T>))
            .route(&query, post(query_entities::<T>))
            .route(
                &item,
                get(get_entity::<T>)
                    .put(update_entity::<T>)
                    .delete(delete_entity::<T>),
            )
            .with_state(self.state.clone())
    }
}

/// All exposed entity types, in registration order
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second registration of the same type replaces the first
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        if self.descriptors.contains_key(&entity_type) {
            tracing::warn!(entity_type = %entity_type, "Replacing registered entity routes");
        }
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of every registered type
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(
                    entity_type = descriptor.entity_type(),
                    plural = descriptor.plural(),
                    "Mounting entity routes"
                );
                router.merge(descriptor.build_routes())
            })
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn plural_of(&self, entity_type: &str) -> Option<&str> {
        self.descriptors.get(entity_type).map(|d| d.plural())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Owner, Property};
    use crate::storage::InMemoryRepository;

    fn resource<T: EntityPayload>() -> Box<dyn EntityDescriptor> {
        Box::new(RestResource::<T>::new(
            Arc::new(InMemoryRepository::<T>::new()),
            PagingConfig::default(),
        ))
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = EntityRegistry::new();
        registry.register(resource::<Property>());
        registry.register(resource::<Owner>());

        assert_eq!(registry.entity_types(), vec!["property", "owner"]);
        assert_eq!(registry.plural_of("property"), Some("properties"));
        assert_eq!(registry.plural_of("tenant"), None);
    }

    #[test]
    fn test_duplicate_registration_replaces() {
        let mut registry = EntityRegistry::new();
        registry.register(resource::<Owner>());
        registry.register(resource::<Owner>());
        assert_eq!(registry.entity_types().len(), 1);
    }

    #[test]
    fn test_build_routes() {
        let mut registry = EntityRegistry::new();
        registry.register(resource::<Property>());
        registry.register(resource::<Owner>());
        let _router = registry.build_routes();
    }
}
