//! Generic CRUD and query handlers
//!
//! Every handler works for any [`EntityPayload`] type; the concrete routes are
//! assembled by [`RestResource`](super::entity_registry::RestResource).

use crate::config::PagingConfig;
use crate::core::error::{EntityError, EstateError, EstateResult};
use crate::core::{
    Entity, EntityPayload, PaginatedResponse, QueryFilterRequest, Repository, Specification,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// State shared by the handlers of one entity type
pub struct EntityState<T: Entity> {
    pub repository: Arc<dyn Repository<T>>,
    pub paging: PagingConfig,
}

impl<T: Entity> Clone for EntityState<T> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            paging: self.paging.clone(),
        }
    }
}

/// `GET /{plural}`
pub async fn list_entities<T: EntityPayload>(
    State(state): State<EntityState<T>>,
) -> EstateResult<Json<Vec<T>>> {
    Ok(Json(state.repository.list().await?))
}

/// `POST /{plural}/query`
///
/// A body without `pageSize` gets the configured default page size.
pub async fn query_entities<T: EntityPayload>(
    State(state): State<EntityState<T>>,
    Json(mut body): Json<Value>,
) -> EstateResult<Json<PaginatedResponse<T>>> {
    if let Some(fields) = body.as_object_mut() {
        fields
            .entry("pageSize")
            .or_insert_with(|| Value::from(state.paging.default_page_size));
    }
    let mut request: QueryFilterRequest = serde_json::from_value(body)
        .map_err(|e| EstateError::BadRequest(format!("invalid query request: {}", e)))?;
    request.clamp_page_size(state.paging.max_page_size);

    let builder = Specification::<T>::from_request(&request).require_any_filter()?;

    tracing::debug!(
        entity_type = T::type_name(),
        filters = request.filters.len(),
        dropped = builder.dropped_filters().len(),
        "Evaluating query"
    );

    Ok(Json(state.repository.find_page(builder.build()).await?))
}

/// `GET /{plural}/{id}`
pub async fn get_entity<T: EntityPayload>(
    State(state): State<EntityState<T>>,
    Path(id): Path<Uuid>,
) -> EstateResult<Json<T>> {
    state
        .repository
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| EntityError::not_found(T::type_name(), id).into())
}

/// `POST /{plural}`
pub async fn create_entity<T: EntityPayload>(
    State(state): State<EntityState<T>>,
    Json(payload): Json<T::Payload>,
) -> EstateResult<Response> {
    let created = state.repository.create(T::create_from(payload)).await?;
    tracing::info!(entity_type = T::type_name(), id = %created.id(), "Entity created");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// `PUT /{plural}/{id}`
pub async fn update_entity<T: EntityPayload>(
    State(state): State<EntityState<T>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<T::Payload>,
) -> EstateResult<Json<T>> {
    let mut entity = state
        .repository
        .get(&id)
        .await?
        .ok_or_else(|| EstateError::from(EntityError::not_found(T::type_name(), id)))?;

    entity.update_from(payload);
    let updated = state.repository.update(&id, entity).await?;
    Ok(Json(updated))
}

/// `DELETE /{plural}/{id}`
pub async fn delete_entity<T: EntityPayload>(
    State(state): State<EntityState<T>>,
    Path(id): Path<Uuid>,
) -> EstateResult<StatusCode> {
    state.repository.delete(&id).await?;
    tracing::info!(entity_type = T::type_name(), %id, "Entity deleted");
    Ok(StatusCode::NO_CONTENT)
}
