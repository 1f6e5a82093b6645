use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory picture files are stored under
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./data/pictures")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file holding picture records
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/gallery.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    /// Page size used when the caller does not ask for one (default: 20)
    #[serde(default = "default_rows")]
    pub default_rows: i64,

    /// Upper bound on a requested page size (default: 100)
    #[serde(default = "default_max_rows")]
    pub max_rows: i64,
}

fn default_rows() -> i64 {
    20
}
fn default_max_rows() -> i64 {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_rows: default_rows(),
            max_rows: default_max_rows(),
        }
    }
}

impl ListingConfig {
    /// Page size to use for a request, capped at `max_rows`.
    pub fn page_size(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_rows)
            .clamp(0, self.max_rows)
    }
}
