//! # Persistence Layer
//!
//! Per-season SQLite stores for scraped player statistics.
//!
//! ## Architecture
//!
//! - **schema**: static abbreviation → column table and cell coercion
//! - **SeasonStore**: one SQLite file per season, replaced wholesale on every scrape
//! - **delete**: removal of a single season's store
//!
//! ## Usage
//!
//! ```no_run
//! use persistence::{SeasonSchema, SeasonStore, StoreConfig};
//!
//! # async fn run(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SeasonSchema::from_headers(&headers)?;
//! let typed = schema.coerce_rows(&rows)?;
//!
//! let store = SeasonStore::open(&StoreConfig::new("./data"), 2024).await?;
//! store.replace_season(&schema, &typed, "https://example.test", persistence::Utc::now()).await?;
//! let records = store.load_records().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delete;
pub mod error;
pub mod records;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use delete::{delete_season_store, DeletionOutcome};
pub use error::{Result, SchemaError, StoreError};
pub use records::{is_aggregate_team, PlayerSeasonRecord, ScrapeMetadata};
pub use schema::{CellValue, ColumnKind, ColumnSpec, SeasonSchema, COLUMN_MAPPINGS};
pub use store::SeasonStore;

pub use chrono::{DateTime, Utc};
