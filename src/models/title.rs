use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ItemId;

/// A row of the movie title table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub item_id: ItemId,
    /// Release year, absent when the source carries `NULL`
    pub year: Option<i32>,
    pub title: String,
    /// Selector key shown to users, `"<title> - <year>"`
    pub display: String,
}

impl CatalogEntry {
    /// Creates an entry, deriving the display key from the raw year token
    pub fn new(item_id: ItemId, year_token: &str, title: String) -> Self {
        let display = format!("{} - {}", title, year_token);
        Self {
            item_id,
            year: year_token.trim().parse().ok(),
            title,
            display,
        }
    }
}

/// Movie title table ordered by title
///
/// Table order decides which row wins when two entries share a display key.
#[derive(Debug, Clone, Default)]
pub struct TitleCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<ItemId, usize>,
    by_display: HashMap<String, usize>,
}

impl TitleCatalog {
    /// Builds the catalog, ordering entries by title (stable)
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| a.title.cmp(&b.title));

        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_display = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_id.entry(entry.item_id).or_insert(idx);
            by_display.entry(entry.display.clone()).or_insert(idx);
        }

        Self {
            entries,
            by_id,
            by_display,
        }
    }

    /// Resolves a display key to its item id, first row in table order wins
    pub fn resolve(&self, display: &str) -> Option<ItemId> {
        self.by_display
            .get(display)
            .map(|&idx| self.entries[idx].item_id)
    }

    pub fn get(&self, item_id: ItemId) -> Option<&CatalogEntry> {
        self.by_id.get(&item_id).map(|&idx| &self.entries[idx])
    }

    /// Display keys in table order, used as selector options
    pub fn display_options(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.display.as_str()).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
