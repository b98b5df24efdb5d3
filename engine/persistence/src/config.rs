//! Configuration for the season stores

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where season stores live and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base directory for store files
    pub data_dir: PathBuf,

    /// File name prefix; the season year and `.db` are appended
    pub file_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data"), file_prefix: "nba_database".to_string() }
    }
}

impl StoreConfig {
    /// Create a new configuration with the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    /// Path of the store file for a season
    pub fn store_path(&self, season: u16) -> PathBuf {
        self.data_dir.join(format!("{}_{season}.db", self.file_prefix))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.file_prefix.is_empty() {
            return Err("Store file prefix cannot be empty".to_string());
        }

        if self.file_prefix.contains(|c: char| c == '/' || c == '\\') {
            return Err(format!("Store file prefix '{}' must not contain path separators", self.file_prefix));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path() {
        let config = StoreConfig::new("/tmp/nba");
        assert_eq!(config.store_path(2024), PathBuf::from("/tmp/nba/nba_database_2024.db"));
    }

    #[test]
    fn test_validation() {
        assert!(StoreConfig::default().validate().is_ok());

        let config = StoreConfig { file_prefix: String::new(), ..Default::default() };
        assert!(config.validate().is_err());

        let config = StoreConfig { file_prefix: "../escape".to_string(), ..Default::default() };
        assert!(config.validate().is_err());
    }
}
