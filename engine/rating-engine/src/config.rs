use anyhow::Context;
use config::{Config, Environment, File};
use persistence::StoreConfig;
use player_scraper::ScraperSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::calculator::RatingWeights;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "nba-ratings";

/// Prefix of environment overrides, e.g. `NBA_RATINGS__PIPELINE__SEASONS=2023,2024`
pub const ENV_PREFIX: &str = "NBA_RATINGS";

/// First season published under the NBA name
const FIRST_SEASON: u16 = 1950;

/// Configuration for the ratings pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Source site and HTTP client settings
    pub scraper: ScraperSettings,

    /// Season store location
    pub store: StoreConfig,

    /// Which seasons to process and report
    pub pipeline: PipelineConfig,

    /// Leaderboard sizes and filters
    pub report: ReportSettings,

    /// Rating coefficients
    pub weights: RatingWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seasons scraped and rated, in processing order
    pub seasons: Vec<u16>,

    /// Seasons whose leaderboards are printed after a run
    pub report_seasons: Vec<u16>,

    /// Pause between consecutive season fetches in milliseconds
    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Size of the league-wide leaderboard
    pub overall_limit: usize,

    /// Size of each position leaderboard
    pub position_limit: usize,

    /// Size of each team leaderboard
    pub team_limit: usize,

    /// Games played required for the overall and position leaderboards
    pub min_games: i64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { overall_limit: 75, position_limit: 10, team_limit: 5, min_games: 50 }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { seasons: vec![2024], report_seasons: vec![2024], request_delay_ms: 3000 }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            scraper: ScraperSettings::default(),
            store: StoreConfig::default(),
            pipeline: PipelineConfig::default(),
            report: ReportSettings::default(),
            weights: RatingWeights::default(),
        }
    }
}

impl RatingConfig {
    /// Load configuration: defaults, then a config file, then environment
    ///
    /// An explicit `path` must exist; otherwise `nba-ratings.{toml,json,yaml}`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default()).context("Failed to encode default configuration")?;

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: Self = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pipeline.seasons")
                    .with_list_parse_key("pipeline.report_seasons")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.weights.validate().map_err(anyhow::Error::msg)?;
        self.store.validate().map_err(anyhow::Error::msg)?;

        if self.pipeline.seasons.is_empty() {
            anyhow::bail!("At least one season must be configured");
        }

        for season in self.pipeline.seasons.iter().chain(&self.pipeline.report_seasons) {
            if *season < FIRST_SEASON {
                anyhow::bail!("Season {season} predates the first NBA season ({FIRST_SEASON})");
            }
        }

        let report = &self.report;
        if report.overall_limit == 0 || report.position_limit == 0 || report.team_limit == 0 {
            anyhow::bail!("Leaderboard sizes must be greater than zero");
        }

        if report.min_games < 0 {
            anyhow::bail!("Minimum games cannot be negative");
        }

        if self.scraper.timeout_secs == 0 {
            anyhow::bail!("Request timeout must be greater than zero");
        }

        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.pipeline.request_delay_ms)
    }
}
