use anyhow::{Context, Result};
use clap::Parser;
use persistence::{delete_season_store, DeletionOutcome};
use rating_engine::RatingConfig;
use std::path::PathBuf;
use tracing::info;

/// Delete one season's store file
#[derive(Parser)]
#[command(name = "delete-season")]
struct Args {
    /// Season year whose store is removed (e.g. 2024)
    season: u16,

    /// Directory holding the season stores (overrides the configuration)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    rating_engine::init_tracing();

    let args = Args::parse();
    let mut config = RatingConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = args.data_dir {
        config.store.data_dir = data_dir;
    }

    info!("Deleting store for season {}", args.season);
    let outcome = delete_season_store(&config.store, args.season)
        .await
        .with_context(|| format!("Failed to delete store for season {}", args.season))?;

    match outcome {
        DeletionOutcome::Deleted(path) => println!("Deleted {}", path.display()),
        DeletionOutcome::NotFound(path) => println!("No store for season {} at {}", args.season, path.display()),
    }

    Ok(())
}
