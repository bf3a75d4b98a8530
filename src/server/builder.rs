//! ServerBuilder for assembling the HTTP application

use super::entity_registry::{EntityRegistry, RestResource};
use crate::cache::{CacheService, CachedRepository};
use crate::config::EstateConfig;
use crate::core::{EntityPayload, Repository};
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Fluent builder for the REST application
///
/// # Example
///
/// ```ignore
/// let cache = CacheService::from_config(Arc::new(InMemoryCacheTransport::new()), &config.cache);
/// let owners = InMemoryRepository::<Owner>::new();
/// let properties = InMemoryRepository::new().with_relation(Property::owner_relation(owners.clone()));
/// let app = ServerBuilder::new()
///     .with_config(config)
///     .with_cache(cache)
///     .register::<Property>(properties)
///     .register::<Owner>(owners)
///     .build();
/// ```
pub struct ServerBuilder {
    config: EstateConfig,
    cache: Option<CacheService>,
    entity_registry: EntityRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: EstateConfig::default(),
            cache: None,
            entity_registry: EntityRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Use this configuration for paging limits
    ///
    /// Must be called before `register` to affect the registered types.
    pub fn with_config(mut self, config: EstateConfig) -> Self {
        self.config = config;
        self
    }

    /// Wrap every subsequently registered repository in a [`CachedRepository`]
    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Expose an entity type backed by `repository`
    pub fn register<T: EntityPayload>(mut self, repository: impl Repository<T> + 'static) -> Self {
        let repository: Arc<dyn Repository<T>> = match &self.cache {
            Some(cache) if cache.is_enabled() => {
                Arc::new(CachedRepository::<T, _>::new(repository, cache.clone()))
            }
            _ => Arc::new(repository),
        };

        tracing::debug!(
            entity_type = T::type_name(),
            cached = self.cache.as_ref().is_some_and(|c| c.is_enabled()),
            "Registering entity"
        );

        self.entity_registry.register(Box::new(RestResource::new(
            repository,
            self.config.paging.clone(),
        )));
        self
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }

    pub fn build(self) -> Router {
        let mut app = Self::health_routes().merge(self.entity_registry.build_routes());
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }
        app.layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown on Ctrl+C or SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/healthz", get(health_check))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheTransport;
    use crate::entities::{Owner, Property};
    use crate::storage::InMemoryRepository;

    #[test]
    fn test_register_entities() {
        let builder = ServerBuilder::new()
            .register::<Property>(InMemoryRepository::new())
            .register::<Owner>(InMemoryRepository::new());
        assert_eq!(builder.entity_types(), vec!["property", "owner"]);
        let _app = builder.build();
    }

    #[test]
    fn test_register_with_cache() {
        let config = EstateConfig::default();
        let cache =
            CacheService::from_config(Arc::new(InMemoryCacheTransport::new()), &config.cache);
        let builder = ServerBuilder::new()
            .with_config(config)
            .with_cache(cache)
            .register::<Property>(InMemoryRepository::new());
        assert_eq!(builder.entity_types(), vec!["property"]);
    }
}
