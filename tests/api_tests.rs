use axum_test::TestServer;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use bingewatch::{
    config::Config,
    models::{CatalogEntry, ContentCatalog, ContentMetadata, TitleCatalog},
    routes::{create_router, AppState},
    similarity::SimilarityRow,
    store::{RecommendationStore, Snapshot},
};

fn content(id: &str, content_type: &str, genres: &str, year: i32, votes: u64) -> ContentMetadata {
    ContentMetadata::new(
        id.to_string(),
        content_type.to_string(),
        format!("Title {}", id),
        year,
        genres.to_string(),
        2.0,
        votes,
    )
}

fn test_snapshot() -> Snapshot {
    let titles = TitleCatalog::new(vec![
        CatalogEntry::new(1, "1995", "Heat".to_string()),
        CatalogEntry::new(2, "1995", "Casino".to_string()),
        CatalogEntry::new(3, "1990", "Goodfellas".to_string()),
    ]);

    let mut rows = BTreeMap::new();
    rows.insert(
        1,
        SimilarityRow {
            ids: vec![3, 2],
            scores: vec![0.876, 0.5],
        },
    );

    let content = ContentCatalog::new(vec![
        content("tt1", "movie", "Action,Romance", 1995, 10),
        content("tt2", "movie", "Comedy", 1995, 30),
        content("tt3", "movie", "Comedy", 2001, 20),
        content("tt4", "tvSeries", "Comedy", 1995, 99),
    ]);

    Snapshot {
        store: RecommendationStore::from_rows(rows, 99),
        titles,
        content,
    }
}

fn test_config(dir: &Path) -> Config {
    let vars = vec![
        (
            "RATINGS_PATHS".to_string(),
            dir.join("combined_data_1.txt").display().to_string(),
        ),
        (
            "TITLES_PATH".to_string(),
            dir.join("movie_titles.csv").display().to_string(),
        ),
        (
            "IMDB_BASICS_PATH".to_string(),
            dir.join("title.basics.tsv").display().to_string(),
        ),
        (
            "IMDB_RATINGS_PATH".to_string(),
            dir.join("title.ratings.tsv").display().to_string(),
        ),
        (
            "SNAPSHOT_PATH".to_string(),
            dir.join("recommendations.json").display().to_string(),
        ),
    ];
    envy::from_iter(vars).unwrap()
}

fn create_test_server(dir: &Path) -> TestServer {
    let state = AppState::new(test_snapshot(), test_config(dir));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_recommendations_for_single_selection() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": "Heat - 1995" }))
        .await;

    response.assert_status_ok();
    let results: Vec<serde_json::Value> = response.json();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Goodfellas");
    assert_eq!(results[0]["year"], 1990);
    assert_eq!(results[0]["match_percent"], 88);
    assert_eq!(results[1]["title"], "Casino");
    assert_eq!(results[1]["match_percent"], 50);
}

#[tokio::test]
async fn test_recommendations_use_first_of_list_selection() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": ["Heat - 1995", "Casino - 1995"], "top_n": 1 }))
        .await;

    response.assert_status_ok();
    let results: Vec<serde_json::Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Goodfellas");
}

#[tokio::test]
async fn test_recommendations_not_found() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": "Casino - 1995" }))
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Casino - 1995"));
}

#[tokio::test]
async fn test_recommendations_empty_selection() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": [] }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discover_by_type_only() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/v1/discover")
        .add_query_param("type", "movie")
        .add_query_param("genre", "Comedy")
        .await;

    response.assert_status_ok();
    let rows: Vec<serde_json::Value> = response.json();
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    // Genre is not active, so its value is ignored
    assert_eq!(ids, vec!["tt2", "tt3", "tt1"]);
}

#[tokio::test]
async fn test_discover_with_genre_and_year() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/v1/discover")
        .add_query_param("type", "movie")
        .add_query_param("filters", "Genre,Year")
        .add_query_param("genre", "Comedy")
        .add_query_param("year", 1995)
        .await;

    response.assert_status_ok();
    let rows: Vec<serde_json::Value> = response.json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "tt2");
    assert_eq!(rows[0]["weighted_score"], 60.0);
}

#[tokio::test]
async fn test_discover_unknown_filter() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/v1/discover")
        .add_query_param("type", "movie")
        .add_query_param("filters", "Language")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discover_non_numeric_year_is_json_error() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .get("/api/v1/discover")
        .add_query_param("type", "movie")
        .add_query_param("filters", "Year")
        .add_query_param("year", "nineteen")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("query string"));
}

#[tokio::test]
async fn test_recommendations_malformed_body_is_json_error() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": "Heat - 1995", "top_n": "ten" }))
        .await;
    assert!(response.status_code().is_client_error());
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_titles_and_genres() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    let titles: Vec<String> = server.get("/api/v1/titles").await.json();
    assert_eq!(
        titles,
        vec!["Casino - 1995", "Goodfellas - 1990", "Heat - 1995"]
    );

    let genres: Vec<String> = server.get("/api/v1/genres").await.json();
    assert_eq!(genres, vec!["Action", "Comedy", "Romance"]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_serving_old_snapshot() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());
    std::fs::write(dir.path().join("combined_data_1.txt"), "not ratings\n").unwrap();

    let response = server.post("/api/v1/admin/refresh").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": "Heat - 1995" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_refresh_publishes_new_snapshot() {
    let dir = TempDir::new().unwrap();
    let server = create_test_server(dir.path());

    std::fs::write(
        dir.path().join("combined_data_1.txt"),
        "2:\n10,5,2005-01-01\n11,4,2005-01-01\n3:\n10,5,2005-01-01\n11,4,2005-01-01\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("movie_titles.csv"),
        "2,1995,Casino\n3,1990,Goodfellas\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("title.basics.tsv"),
        "tconst\ttitleType\tprimaryTitle\tstartYear\tgenres\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("title.ratings.tsv"),
        "tconst\taverageRating\tnumVotes\n",
    )
    .unwrap();

    let response = server.post("/api/v1/admin/refresh").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["version"], 2);
    assert_eq!(body["items"], 2);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "selection": "Casino - 1995" }))
        .await;
    response.assert_status_ok();
    let results: Vec<serde_json::Value> = response.json();
    assert_eq!(results[0]["title"], "Goodfellas");
    assert_eq!(results[0]["match_percent"], 100);
    assert!(dir.path().join("recommendations.json").exists());
}
