use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod content;
pub mod title;

pub use content::{ContentCatalog, ContentMetadata};
pub use title::{CatalogEntry, TitleCatalog};

/// Netflix item (movie) identifier
pub type ItemId = u32;

/// Netflix user identifier
pub type UserId = u32;

/// A single user rating observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub value: f32,
    pub date: NaiveDate,
}

/// One row of a recommendation result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub year: Option<i32>,
    pub title: String,
    pub match_percent: u8,
}

/// Optional filter stages of attribute discovery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FilterCategory {
    Genre,
    Year,
}

impl Display for FilterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterCategory::Genre => write!(f, "Genre"),
            FilterCategory::Year => write!(f, "Year"),
        }
    }
}

impl FromStr for FilterCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "genre" => Ok(FilterCategory::Genre),
            "year" => Ok(FilterCategory::Year),
            other => Err(format!("unknown filter category '{}'", other)),
        }
    }
}
