use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{
    error::AppResult, middleware::request_id::RequestId, routes::AppState, services::pipeline,
};

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub version: u64,
    pub items: usize,
}

/// Rebuilds the recommendation snapshot and swaps it in
///
/// Requests arriving during a rebuild wait for it and then rebuild again. A
/// rebuild that has started completes even if the client disconnects.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RefreshResponse>> {
    tracing::info!(request_id = %request_id, "Starting snapshot refresh");

    let version = pipeline::refresh(state.snapshots.clone(), (*state.config).clone()).await?;
    let items = state.snapshots.current().await.store.len();

    Ok(Json(RefreshResponse { version, items }))
}
