use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored player row: a player's season with one team, or the
/// aggregate of all teams for a player traded mid-season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRecord {
    /// SQLite rowid, stable for the lifetime of the table
    pub row_id: i64,
    pub season: u16,
    pub name: String,
    /// Position designation as listed, e.g. "SG" or "SG-SF"
    pub position: String,
    /// Team code, or an aggregate code such as "TOT" / "2TM"
    pub team: String,
    pub age: i64,
    pub games_played: i64,
    pub games_started: i64,
    pub minutes: f64,
    pub field_goals_made: f64,
    pub field_goals_attempted: f64,
    pub three_pointers_made: f64,
    pub three_pointers_attempted: f64,
    pub free_throws_made: f64,
    pub free_throws_attempted: f64,
    pub offensive_rebounds: f64,
    pub defensive_rebounds: f64,
    pub total_rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub personal_fouls: f64,
    pub points: f64,
    /// Derived rating, `None` until the season has been rated
    pub rating: Option<f64>,
}

impl PlayerSeasonRecord {
    /// Whether this row combines several team stints of a traded player
    ///
    /// The site uses `TOT` up to the 2024 season and `2TM`, `3TM`, ...
    /// afterwards.
    pub fn is_aggregate(&self) -> bool {
        is_aggregate_team(&self.team)
    }

    /// Rating, or zero for an unrated row
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

/// Whether a team code denotes a multi-team aggregate row
pub fn is_aggregate_team(team: &str) -> bool {
    if team == "TOT" {
        return true;
    }

    match team.strip_suffix("TM") {
        Some(count) => !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Provenance of a season table, stored alongside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    pub season: u16,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    pub row_count: i64,
}
