use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::ItemId;

pub mod sparse;

pub use sparse::SparseItemSpace;

/// A set of item vectors that supports cosine similarity
///
/// Items are addressed by their position in `item_ids`, which must be in
/// ascending id order.
pub trait VectorSpace: Sync {
    fn item_ids(&self) -> &[ItemId];

    /// Nonzero cosine similarities between item `index` and every other item,
    /// in any order. The item itself must not appear.
    fn cosine_similarities(&self, index: usize) -> Vec<(usize, f64)>;
}

/// Ranked neighbors of one item as parallel id/score sequences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRow {
    pub ids: Vec<ItemId>,
    pub scores: Vec<f64>,
}

impl SimilarityRow {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }

    /// The first `n` neighbors, already in rank order
    pub fn top(&self, n: usize) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.iter().take(n)
    }
}

/// Descending score, then ascending position (and so ascending item id)
fn rank_order(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Keeps the `limit` best entries, sorted by `rank_order`
fn top_neighbors(mut scored: Vec<(usize, f64)>, limit: usize) -> Vec<(usize, f64)> {
    if scored.len() > limit {
        scored.select_nth_unstable_by(limit, rank_order);
        scored.truncate(limit);
    }
    scored.sort_unstable_by(rank_order);
    scored
}

/// Produces bounded, ranked neighbor lists for every item of a vector space
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEngine {
    neighbor_limit: usize,
}

impl SimilarityEngine {
    pub fn new(neighbor_limit: usize) -> Self {
        Self { neighbor_limit }
    }

    pub fn neighbor_limit(&self) -> usize {
        self.neighbor_limit
    }

    /// Ranks the neighbors of every item
    ///
    /// Items without any nonzero similarity are left out. Work is spread over
    /// the rayon pool per item; each row is computed independently, so the
    /// result does not depend on the number of threads.
    pub fn rank_all<S: VectorSpace>(&self, space: &S) -> BTreeMap<ItemId, SimilarityRow> {
        let item_ids = space.item_ids();
        let limit = self.neighbor_limit;

        let rows: Vec<Option<(ItemId, SimilarityRow)>> = (0..item_ids.len())
            .into_par_iter()
            .map(|index| {
                let ranked = top_neighbors(space.cosine_similarities(index), limit);
                if ranked.is_empty() {
                    return None;
                }
                let row = SimilarityRow {
                    ids: ranked.iter().map(|&(other, _)| item_ids[other]).collect(),
                    scores: ranked.iter().map(|&(_, score)| score).collect(),
                };
                Some((item_ids[index], row))
            })
            .collect();

        rows.into_iter().flatten().collect()
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new(99)
    }
}
