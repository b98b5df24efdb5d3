//! Whole-store deletion for a single season

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::Result;

/// SQLite side files that may sit next to a store
const SIDE_FILE_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// What happened when a season's store was deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The store existed and was removed
    Deleted(PathBuf),
    /// No store existed for the season
    NotFound(PathBuf),
}

impl DeletionOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DeletionOutcome::Deleted(path) | DeletionOutcome::NotFound(path) => path,
        }
    }

    pub fn was_deleted(&self) -> bool {
        matches!(self, DeletionOutcome::Deleted(_))
    }
}

/// Delete the store file of one season
///
/// A missing store is reported as [`DeletionOutcome::NotFound`], not as an
/// error. Stores of other seasons are never touched.
pub async fn delete_season_store(config: &StoreConfig, season: u16) -> Result<DeletionOutcome> {
    let path = config.store_path(season);

    if !tokio::fs::try_exists(&path).await? {
        info!("No store for season {} at {:?}", season, path);
        return Ok(DeletionOutcome::NotFound(path));
    }

    tokio::fs::remove_file(&path).await?;

    for suffix in SIDE_FILE_SUFFIXES {
        let mut side = path.clone().into_os_string();
        side.push(suffix);
        let side = PathBuf::from(side);
        if tokio::fs::try_exists(&side).await? {
            tokio::fs::remove_file(&side).await?;
            debug!("Removed side file {:?}", side);
        }
    }

    info!("Deleted store for season {} at {:?}", season, path);
    Ok(DeletionOutcome::Deleted(path))
}
