use persistence::{SchemaError, StoreError};
use player_scraper::ScrapeError;
use std::fmt;
use thiserror::Error;

/// Pipeline stage a season failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    Map,
    Store,
    Rate,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Map => "map",
            Stage::Store => "store",
            Stage::Rate => "rate",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Failure of one season's run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Season {season}: fetch failed: {source}")]
    Network {
        season: u16,
        #[source]
        source: ScrapeError,
    },

    #[error("Season {season}: could not parse the statistics table: {source}")]
    Parse {
        season: u16,
        #[source]
        source: ScrapeError,
    },

    #[error("Season {season}: schema mapping failed: {source}")]
    Schema {
        season: u16,
        #[source]
        source: SchemaError,
    },

    #[error("Season {season}: {stage} stage failed: {source}")]
    Store {
        season: u16,
        stage: Stage,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    /// Classify a scraper failure as a network or parse failure
    pub fn from_scrape(season: u16, source: ScrapeError) -> Self {
        if source.is_network() {
            Self::Network { season, source }
        } else {
            Self::Parse { season, source }
        }
    }

    pub fn schema(season: u16, source: SchemaError) -> Self {
        Self::Schema { season, source }
    }

    pub fn store(season: u16, stage: Stage, source: StoreError) -> Self {
        Self::Store { season, stage, source }
    }

    pub fn season(&self) -> u16 {
        match self {
            Self::Network { season, .. }
            | Self::Parse { season, .. }
            | Self::Schema { season, .. }
            | Self::Store { season, .. } => *season,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Network { .. } => Stage::Fetch,
            Self::Parse { .. } => Stage::Parse,
            Self::Schema { .. } => Stage::Map,
            Self::Store { stage, .. } => *stage,
        }
    }
}
