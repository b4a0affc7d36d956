//! HTTP API for lumpy.
//!
//! `POST /api/articles` runs the extraction [`Pipeline`] on a URL and upserts
//! the record into a [`RecordStore`]; the remaining routes list, show, mark
//! and delete saved articles.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use lumpy_core::Pipeline;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use store::{ArticleSummary, MemoryStore, PostgresStore, RecordStore, StoreError, StoredArticle};

/// Shared handler state. Cloning shares the pipeline and the store.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, store: Arc<dyn RecordStore>) -> Self {
        Self { pipeline, store }
    }
}

/// Settings for the outer layers of the router.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub request_timeout: Duration,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self { request_timeout: Duration::from_secs(30), static_dir: None }
    }
}

/// The `/api` routes with their state, without outer layers.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/articles", post(routes::save_article).get(routes::list_articles))
        .route("/api/articles/{id}", get(routes::get_article).delete(routes::delete_article))
        .route("/api/articles/{id}/read", patch(routes::set_read_status))
        .with_state(state)
}

/// The full application: API routes, optional static files, CORS,
/// compression, request timeout and request tracing.
pub fn app(state: AppState, options: &ServeOptions) -> Router {
    let mut router = api_router(state);
    if let Some(dir) = &options.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, options.request_timeout))
        .layer(TraceLayer::new_for_http())
}
