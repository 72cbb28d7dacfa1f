use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    ingest::{load_imdb_catalog, parse_title_table, RatingMatrixBuilder},
    models::{ContentCatalog, TitleCatalog},
    similarity::SimilarityEngine,
    store::{RecommendationStore, Snapshot, SnapshotHandle},
};

fn open(path: &Path) -> AppResult<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open input");
        AppError::Io(e)
    })
}

/// Parses every configured rating file and computes a fresh store
///
/// Nothing is written; a parse error anywhere aborts the whole build.
pub fn build_store(config: &Config) -> AppResult<RecommendationStore> {
    if config.ratings_paths.is_empty() {
        return Err(AppError::InvalidInput(
            "No rating files configured".to_string(),
        ));
    }

    let start = Instant::now();
    let mut builder = RatingMatrixBuilder::new(config.duplicate_ratings);
    for path in &config.ratings_paths {
        builder.read_blocks(&path.display().to_string(), open(path)?)?;
    }
    let matrix = builder.build()?;

    let parsed = start.elapsed();
    let store = RecommendationStore::build(&matrix, &SimilarityEngine::new(config.neighbor_limit));

    tracing::info!(
        items = store.len(),
        parse_ms = parsed.as_millis(),
        total_ms = start.elapsed().as_millis(),
        "Built recommendation store"
    );

    Ok(store)
}

/// Loads the title table and the discovery catalog
pub fn load_catalogs(config: &Config) -> AppResult<(TitleCatalog, ContentCatalog)> {
    let titles = parse_title_table(
        &config.titles_path.display().to_string(),
        open(&config.titles_path)?,
    )?;
    let content = load_imdb_catalog(
        open(&config.imdb_basics_path)?,
        open(&config.imdb_ratings_path)?,
    )?;
    Ok((TitleCatalog::new(titles), content))
}

/// Loads the published store and catalogs for serving
pub fn load_snapshot(config: &Config) -> AppResult<Snapshot> {
    let store = RecommendationStore::load(&config.snapshot_path)?;
    let (titles, content) = load_catalogs(config)?;
    Ok(Snapshot {
        store,
        titles,
        content,
    })
}

/// Builds, persists and loads everything needed for a new snapshot
///
/// The store is saved only after it is fully built, and the save replaces
/// the previous file atomically.
pub fn rebuild(config: &Config) -> AppResult<Snapshot> {
    let store = build_store(config)?;
    let (titles, content) = load_catalogs(config)?;
    store.save(&config.snapshot_path)?;
    Ok(Snapshot {
        store,
        titles,
        content,
    })
}

/// Rebuilds on the blocking pool and publishes the result
///
/// The rebuild runs in its own task holding the handle's rebuild lock, so the
/// save and the publish both happen even if the caller stops waiting, and
/// refreshes never overlap. On any failure the active snapshot stays in place.
pub async fn refresh(handle: Arc<SnapshotHandle>, config: Config) -> AppResult<u64> {
    tokio::spawn(async move {
        let _guard = handle.lock_rebuild().await;
        let start = Instant::now();

        let snapshot = tokio::task::spawn_blocking(move || rebuild(&config))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| {
                tracing::error!(error = %e, "Snapshot rebuild failed, keeping active snapshot");
                e
            })?;

        let version = handle.publish(snapshot).await;
        tracing::info!(
            version,
            elapsed_ms = start.elapsed().as_millis(),
            "Snapshot refresh completed"
        );
        Ok::<_, AppError>(version)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}
