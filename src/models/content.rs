use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A title of the IMDb-style discovery catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentMetadata {
    /// IMDb identifier (e.g., "tt0113277")
    pub id: String,
    /// IMDb title type (e.g., "movie", "tvSeries")
    pub content_type: String,
    pub title: String,
    pub year: i32,
    /// Comma-joined genre list as published by IMDb
    pub genres: String,
    pub average_rating: f64,
    pub num_votes: u64,
    pub weighted_score: f64,
}

impl ContentMetadata {
    /// Creates a row and computes its weighted score
    pub fn new(
        id: String,
        content_type: String,
        title: String,
        year: i32,
        genres: String,
        average_rating: f64,
        num_votes: u64,
    ) -> Self {
        Self {
            id,
            content_type,
            title,
            year,
            genres,
            average_rating,
            num_votes,
            weighted_score: average_rating * num_votes as f64,
        }
    }

    pub fn genre_list(&self) -> impl Iterator<Item = &str> {
        self.genres.split(',').filter(|g| !g.is_empty())
    }
}

/// Read-only discovery catalog in source row order
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    rows: Vec<ContentMetadata>,
    genres: BTreeSet<String>,
}

impl ContentCatalog {
    pub fn new(rows: Vec<ContentMetadata>) -> Self {
        let genres = rows
            .iter()
            .flat_map(|row| row.genre_list())
            .map(str::to_string)
            .collect();
        Self { rows, genres }
    }

    pub fn rows(&self) -> &[ContentMetadata] {
        &self.rows
    }

    /// Unique genres across the catalog, sorted
    pub fn genres(&self) -> &BTreeSet<String> {
        &self.genres
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
