use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    ingest::SparseRatingMatrix,
    models::ItemId,
    similarity::{SimilarityEngine, SimilarityRow, SparseItemSpace},
};

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotHandle};

/// Immutable item → ranked neighbors mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationStore {
    pub built_at: DateTime<Utc>,
    pub neighbor_limit: usize,
    items: BTreeMap<ItemId, SimilarityRow>,
}

impl RecommendationStore {
    /// Computes neighbor lists for every item of the matrix
    pub fn build(matrix: &SparseRatingMatrix, engine: &SimilarityEngine) -> Self {
        let space = SparseItemSpace::new(matrix);
        let items = engine.rank_all(&space);
        Self::from_rows(items, engine.neighbor_limit())
    }

    pub fn from_rows(items: BTreeMap<ItemId, SimilarityRow>, neighbor_limit: usize) -> Self {
        Self {
            built_at: Utc::now(),
            neighbor_limit,
            items,
        }
    }

    pub fn get(&self, item_id: ItemId) -> Option<&SimilarityRow> {
        self.items.get(&item_id)
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.items.contains_key(&item_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &SimilarityRow)> {
        self.items.iter().map(|(&id, row)| (id, row))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Writes the store to `path`
    ///
    /// The document is written to a temporary file next to `path` and renamed
    /// over it only once fully flushed, so readers of `path` see either the
    /// previous snapshot or the new one.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AppError::Io(e.error))?;

        tracing::info!(
            path = %path.display(),
            items = self.items.len(),
            "Saved recommendation store"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let store: RecommendationStore = serde_json::from_reader(reader)?;
        store.validate()?;

        tracing::info!(
            path = %path.display(),
            items = store.items.len(),
            built_at = %store.built_at,
            "Loaded recommendation store"
        );
        Ok(store)
    }

    fn validate(&self) -> AppResult<()> {
        for (&item_id, row) in &self.items {
            if row.ids.len() != row.scores.len() {
                return Err(AppError::Snapshot(format!(
                    "item {} has {} neighbor ids but {} scores",
                    item_id,
                    row.ids.len(),
                    row.scores.len()
                )));
            }
            if row.ids.contains(&item_id) {
                return Err(AppError::Snapshot(format!(
                    "item {} lists itself as a neighbor",
                    item_id
                )));
            }
        }
        Ok(())
    }
}
