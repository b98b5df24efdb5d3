use anyhow::Context;
use chrono::{DateTime, Utc};
use persistence::{CellValue, SeasonSchema, SeasonStore};
use player_scraper::{ScrapedTable, SeasonStatsScraper};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::calculator::{RatingCalculator, RatingWeights};
use crate::config::RatingConfig;
use crate::error::{PipelineError, Stage};
use crate::leaderboard::{LeaderboardBuilder, SeasonLeaderboards};

/// Rates every player row of a season store
pub struct RatingEngine {
    calculator: RatingCalculator,
}

impl RatingEngine {
    pub fn new(weights: RatingWeights) -> Self {
        Self { calculator: RatingCalculator::new(weights) }
    }

    /// Ratings for a season's mapped rows before they are stored
    pub fn rate_rows(&self, season: u16, schema: &SeasonSchema, rows: &[Vec<CellValue>]) -> Vec<f64> {
        let ratings = self.calculator.rate_rows(schema, rows);
        info!("Rated {} players for season {}", ratings.len(), season);
        ratings
    }

    /// Recompute and store the rating of every stored row, returning the number rated
    pub async fn rate_season(&self, store: &SeasonStore) -> persistence::Result<usize> {
        let records = store.load_records().await?;
        let ratings = self.calculator.rate_all(&records);

        let zero_games = records.iter().filter(|r| r.games_played <= 0).count();
        if zero_games > 0 {
            warn!("Season {}: {} players without games rated 0.0", store.season(), zero_games);
        }

        let rated = store.write_ratings(&ratings).await?;
        info!("Rated {} players for season {}", rated, store.season());
        Ok(rated)
    }
}

/// Outcome of one successful season run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub season: u16,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub rows_stored: usize,
    pub rows_rated: usize,
    pub store_path: PathBuf,
}

/// Outcome of a multi-season run
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub completed: Vec<SeasonSummary>,
    pub failed: Vec<PipelineError>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_seasons(&self) -> Vec<u16> {
        self.failed.iter().map(PipelineError::season).collect()
    }
}

/// Fetch, parse, map, store and rate seasons one at a time
pub struct SeasonPipeline {
    config: RatingConfig,
    scraper: SeasonStatsScraper,
    engine: RatingEngine,
    leaderboards: LeaderboardBuilder,
}

impl SeasonPipeline {
    pub fn new(config: RatingConfig) -> anyhow::Result<Self> {
        let scraper = SeasonStatsScraper::new(config.scraper.clone()).context("Failed to build HTTP client")?;
        let engine = RatingEngine::new(config.weights);
        let leaderboards = LeaderboardBuilder::new(config.report.clone());

        Ok(Self { config, scraper, engine, leaderboards })
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Run every stage for one season
    ///
    /// The season's previous table is replaced only once the new rows have
    /// been fetched, parsed, mapped and rated without error.
    pub async fn run_season(&self, season: u16) -> Result<SeasonSummary, PipelineError> {
        let table: ScrapedTable = self
            .scraper
            .scrape_season(season)
            .await
            .map_err(|e| PipelineError::from_scrape(season, e))?;

        let schema = SeasonSchema::from_headers(&table.headers).map_err(|e| PipelineError::schema(season, e))?;
        let rows = schema.coerce_rows(&table.rows).map_err(|e| PipelineError::schema(season, e))?;
        info!("Season {}: mapped {} columns over {} rows", season, schema.len(), rows.len());

        let store = SeasonStore::open(&self.config.store, season)
            .await
            .map_err(|e| PipelineError::store(season, Stage::Store, e))?;

        let ratings = self.engine.rate_rows(season, &schema, &rows);

        // Rows and ratings commit together so a report never sees an unrated scrape
        let stored = store
            .replace_rated_season(&schema, &rows, &ratings, &table.source_url, table.scraped_at)
            .await;
        let store_path = store.path().to_path_buf();
        store.close().await;
        let metadata = stored.map_err(|e| PipelineError::store(season, Stage::Store, e))?;

        Ok(SeasonSummary {
            season,
            source_url: metadata.source_url,
            scraped_at: metadata.scraped_at,
            rows_stored: rows.len(),
            rows_rated: ratings.len(),
            store_path,
        })
    }

    /// Re-rate an existing store with the configured weights
    pub async fn rerate_season(&self, season: u16) -> Result<usize, PipelineError> {
        let store = SeasonStore::open_existing(&self.config.store, season)
            .await
            .map_err(|e| PipelineError::store(season, Stage::Rate, e))?;

        let rated = self.engine.rate_season(&store).await;
        store.close().await;
        rated.map_err(|e| PipelineError::store(season, Stage::Rate, e))
    }

    /// Run each season in order, pausing between fetches
    ///
    /// A failed season is logged and recorded; later seasons still run.
    pub async fn run_all(&self, seasons: &[u16]) -> PipelineReport {
        let mut report = PipelineReport::default();
        let delay = self.config.request_delay();

        for (index, &season) in seasons.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.run_season(season).await {
                Ok(summary) => {
                    info!(
                        "Season {} complete: {} rows stored, {} rated",
                        season, summary.rows_stored, summary.rows_rated
                    );
                    report.completed.push(summary);
                }
                Err(e) => {
                    error!("Season {} failed at {} stage: {}", e.season(), e.stage(), e);
                    report.failed.push(e);
                }
            }
        }

        info!(
            "Processed {} seasons: {} completed, {} failed",
            seasons.len(),
            report.completed.len(),
            report.failed.len()
        );

        report
    }

    /// Leaderboards from a season's existing rated store
    pub async fn leaderboards(&self, season: u16) -> Result<SeasonLeaderboards, PipelineError> {
        let store = SeasonStore::open_existing(&self.config.store, season)
            .await
            .map_err(|e| PipelineError::store(season, Stage::Report, e))?;

        let records = store.load_rated_records().await;
        store.close().await;
        let records = records.map_err(|e| PipelineError::store(season, Stage::Report, e))?;

        Ok(self.leaderboards.build(season, &records))
    }
}
