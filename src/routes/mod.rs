use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    store::{Snapshot, SnapshotHandle},
};

pub mod admin;
pub mod discover;
pub mod recommendations;
pub mod titles;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<SnapshotHandle>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(snapshot: Snapshot, config: Config) -> Self {
        Self {
            snapshots: Arc::new(SnapshotHandle::new(snapshot)),
            config: Arc::new(config),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/discover", get(discover::discover))
        .route("/titles", get(titles::list_titles))
        .route("/genres", get(titles::list_genres))
        .route("/admin/refresh", post(admin::refresh))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
