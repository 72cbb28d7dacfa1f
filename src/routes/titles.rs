use axum::{extract::State, Json};

use crate::routes::AppState;

/// Display keys of every selectable title
pub async fn list_titles(State(state): State<AppState>) -> Json<Vec<String>> {
    let snapshot = state.snapshots.current().await;
    Json(
        snapshot
            .titles
            .display_options()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

/// Unique genres of the discovery catalog
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<String>> {
    let snapshot = state.snapshots.current().await;
    Json(snapshot.content.genres().iter().cloned().collect())
}
