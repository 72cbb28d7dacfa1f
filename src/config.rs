use serde::Deserialize;
use std::path::PathBuf;

use crate::ingest::DuplicatePolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Rating block files, comma separated
    #[serde(default = "default_ratings_paths")]
    pub ratings_paths: Vec<PathBuf>,

    /// Raw `<id>,<year>,<title>` movie title table
    #[serde(default = "default_titles_path")]
    pub titles_path: PathBuf,

    /// IMDb `title.basics.tsv`
    #[serde(default = "default_imdb_basics_path")]
    pub imdb_basics_path: PathBuf,

    /// IMDb `title.ratings.tsv`
    #[serde(default = "default_imdb_ratings_path")]
    pub imdb_ratings_path: PathBuf,

    /// Where the recommendation snapshot is published
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Maximum neighbors kept per item
    #[serde(default = "default_neighbor_limit")]
    pub neighbor_limit: usize,

    /// What to do when a user rates the same item twice
    #[serde(default)]
    pub duplicate_ratings: DuplicatePolicy,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ratings_paths() -> Vec<PathBuf> {
    (1..=4)
        .map(|i| PathBuf::from(format!("data/netflix-prize-data/combined_data_{}.txt", i)))
        .collect()
}

fn default_titles_path() -> PathBuf {
    PathBuf::from("data/netflix-prize-data/movie_titles.csv")
}

fn default_imdb_basics_path() -> PathBuf {
    PathBuf::from("data/imdb/title.basics.tsv")
}

fn default_imdb_ratings_path() -> PathBuf {
    PathBuf::from("data/imdb/title.ratings.tsv")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/pre_processed/recommendations.json")
}

fn default_neighbor_limit() -> usize {
    99
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.neighbor_limit == 0 {
            anyhow::bail!("NEIGHBOR_LIMIT must be at least 1");
        }
        Ok(())
    }
}
