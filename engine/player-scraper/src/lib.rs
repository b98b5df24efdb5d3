//! Player Scraper - basketball-reference season statistics
//!
//! Fetches a season's per-game statistics page and extracts the raw
//! header abbreviations and per-player cell strings from its table.

pub mod error;
pub mod fetcher;
pub mod scraper;
pub mod types;

pub use error::{Result, ScrapeError};
pub use fetcher::{ScraperSettings, SeasonStatsScraper};
pub use scraper::parse_per_game_table;
pub use types::ScrapedTable;
