//! HTTP surface: one JSON endpoint per operation

pub mod envelope;
pub mod handlers;
pub mod requests;

pub use envelope::Envelope;

use crate::config::{CorsConfig, ServerConfig};
use crate::search::Searcher;
use crate::store::CollectionStore;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Searcher>,
    pub store: Arc<dyn CollectionStore>,
}

/// Routes without transport layers
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(handlers::search))
        .route("/save", post(handlers::save))
        .route("/suggest/:collection_id", post(handlers::suggest))
        .route("/index/fields/dynamic", post(handlers::index_fields_dynamic))
        .route("/get_document", post(handlers::get_document))
        .route("/get_timeline", post(handlers::get_timeline))
        .route("/new_facet", post(handlers::new_facet))
        .route("/get_range_facet", post(handlers::get_range_facet))
        .route("/get_collection", post(handlers::get_collection))
        .route("/collections", get(handlers::list_collections))
        .route("/health", get(handlers::health))
        .with_state(state)
}

pub struct ApiServer {
    state: AppState,
    config: ServerConfig,
    extra_routes: Option<Router>,
}

impl ApiServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self {
            state,
            config,
            extra_routes: None,
        }
    }

    /// Serve additional stateless routes next to the API (e.g. `/metrics`)
    pub fn merge(mut self, routes: Router) -> Self {
        self.extra_routes = Some(match self.extra_routes.take() {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Build CORS layer from configuration
    fn build_cors_layer(cors_config: &CorsConfig) -> CorsLayer {
        if !cors_config.enabled {
            return CorsLayer::new();
        }

        let origins: Vec<HeaderValue> = cors_config
            .origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .filter_map(|o| o.parse().ok())
            .collect();

        let has_wildcard = cors_config.origins.iter().any(|o| o == "*");

        let cors = if has_wildcard {
            CorsLayer::new().allow_origin(tower_http::cors::Any)
        } else if origins.is_empty() {
            CorsLayer::new()
        } else {
            CorsLayer::new().allow_origin(origins)
        };

        cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    }

    pub fn router(&self) -> Router {
        let mut app = router(self.state.clone());
        if let Some(extra) = &self.extra_routes {
            app = app.merge(extra.clone());
        }

        app.layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(Self::build_cors_layer(&self.config.cors))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
