use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{ContentMetadata, FilterCategory},
    routes::AppState,
    services::discovery::{self, DEFAULT_TOP_N},
};

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    #[serde(rename = "type")]
    pub content_type: String,
    /// Active filter categories, comma separated (e.g. "Genre,Year")
    #[serde(default)]
    pub filters: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub top_n: Option<usize>,
}

impl DiscoverQuery {
    fn active_filters(&self) -> AppResult<Vec<FilterCategory>> {
        self.filters
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse().map_err(AppError::InvalidInput))
            .collect()
    }
}

/// Handler for attribute discovery endpoint
pub async fn discover(
    State(state): State<AppState>,
    query: Result<Query<DiscoverQuery>, QueryRejection>,
) -> AppResult<Json<Vec<ContentMetadata>>> {
    let Query(params) = query?;
    let active = params.active_filters()?;
    let snapshot = state.snapshots.current().await;

    let rows = discovery::filter_and_rank(
        &snapshot.content,
        &params.content_type,
        &active,
        params.year,
        params.genre.as_deref(),
        params.top_n.unwrap_or(DEFAULT_TOP_N),
    );

    Ok(Json(rows.into_iter().cloned().collect()))
}
