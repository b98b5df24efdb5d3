//! NBA season ratings
//!
//! Scrapes a season's per-game statistics, stores them in the season's
//! SQLite store, assigns every player an efficiency rating and builds
//! overall, per-position and per-team leaderboards.

pub mod calculator;
pub mod config;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod report;

pub use calculator::{RatingCalculator, RatingWeights, StatLine};
pub use config::{PipelineConfig, RatingConfig, ReportSettings};
pub use engine::{PipelineReport, RatingEngine, SeasonPipeline, SeasonSummary};
pub use error::{PipelineError, Stage};
pub use leaderboard::{LeaderboardBuilder, LeaderboardEntry, Position, SeasonLeaderboards};
pub use report::{render, OutputFormat, TextReport};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber on stderr, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
