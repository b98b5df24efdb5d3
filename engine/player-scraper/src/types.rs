use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw contents of one season's per-game statistics table
///
/// Cells are kept as the trimmed strings shown on the page; typing happens
/// later when the headers are mapped onto store columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedTable {
    /// Season year (e.g. 2024 for the 2023-24 season)
    pub season: u16,
    /// URL the document was fetched from
    pub source_url: String,
    /// When the document was parsed
    pub scraped_at: DateTime<Utc>,
    /// Column header abbreviations in table order, rank column excluded
    pub headers: Vec<String>,
    /// One entry per player row, aligned with `headers`
    pub rows: Vec<Vec<String>>,
}

impl ScrapedTable {
    /// Create an empty table for a season
    pub fn new(season: u16, source_url: impl Into<String>) -> Self {
        Self {
            season,
            source_url: source_url.into(),
            scraped_at: Utc::now(),
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of player rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header abbreviation
    pub fn column_index(&self, abbreviation: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == abbreviation)
    }
}
