use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
    services::recommendations::{self, DEFAULT_TOP_N},
};

/// A selected title, either a single display key or a multi-select list
///
/// Only the first element of a list is used.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(Vec<String>),
}

impl Selection {
    pub fn first(&self) -> Option<&str> {
        match self {
            Selection::One(value) => Some(value.as_str()),
            Selection::Many(values) => values.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub selection: Selection,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let Json(request) = request?;
    let selector = request
        .selection
        .first()
        .ok_or_else(|| AppError::InvalidInput("Selection is empty".to_string()))?;

    tracing::info!(
        request_id = %request_id,
        selector = %selector,
        "Processing recommendation request"
    );

    let snapshot = state.snapshots.current().await;
    let results = recommendations::recommend(
        &snapshot.titles,
        &snapshot.store,
        selector,
        request.top_n,
    )?;

    Ok(Json(results))
}
