//! Column table for the per-game statistics page
//!
//! Every abbreviation the source emits for the per-game table has exactly one
//! entry here. Adding a column the site starts emitting is a change to
//! [`COLUMN_MAPPINGS`], nothing else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SchemaError;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
        }
    }
}

/// One row of the column table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Header text as shown on the page
    pub abbreviation: &'static str,
    /// Descriptive column name used in the store
    pub column: &'static str,
    pub kind: ColumnKind,
}

const fn map(abbreviation: &'static str, column: &'static str, kind: ColumnKind) -> ColumnMapping {
    ColumnMapping { abbreviation, column, kind }
}

/// Descriptive column names
pub mod columns {
    pub const RANK: &str = "Rank";
    pub const PLAYER_NAME: &str = "PlayerName";
    pub const POSITION: &str = "Position";
    pub const AGE: &str = "Age";
    pub const TEAM: &str = "Team";
    pub const GAMES_PLAYED: &str = "GamesPlayed";
    pub const GAMES_STARTED: &str = "GamesStarted";
    pub const MINUTES_PLAYED: &str = "MinutesPlayed";
    pub const FIELD_GOALS_MADE: &str = "FieldGoalsMade";
    pub const FIELD_GOALS_ATTEMPTED: &str = "FieldGoalsAttempted";
    pub const FIELD_GOAL_PCT: &str = "FieldGoalPct";
    pub const THREE_POINTERS_MADE: &str = "ThreePointersMade";
    pub const THREE_POINTERS_ATTEMPTED: &str = "ThreePointersAttempted";
    pub const THREE_POINT_PCT: &str = "ThreePointPct";
    pub const TWO_POINTERS_MADE: &str = "TwoPointersMade";
    pub const TWO_POINTERS_ATTEMPTED: &str = "TwoPointersAttempted";
    pub const TWO_POINT_PCT: &str = "TwoPointPct";
    pub const EFFECTIVE_FIELD_GOAL_PCT: &str = "EffectiveFieldGoalPct";
    pub const FREE_THROWS_MADE: &str = "FreeThrowsMade";
    pub const FREE_THROWS_ATTEMPTED: &str = "FreeThrowsAttempted";
    pub const FREE_THROW_PCT: &str = "FreeThrowPct";
    pub const OFFENSIVE_REBOUNDS: &str = "OffensiveRebounds";
    pub const DEFENSIVE_REBOUNDS: &str = "DefensiveRebounds";
    pub const TOTAL_REBOUNDS: &str = "TotalRebounds";
    pub const ASSISTS: &str = "Assists";
    pub const STEALS: &str = "Steals";
    pub const BLOCKS: &str = "Blocks";
    pub const TURNOVERS: &str = "Turnovers";
    pub const PERSONAL_FOULS: &str = "PersonalFouls";
    pub const POINTS: &str = "Points";
    pub const AWARDS: &str = "Awards";
    /// Derived column appended to every season table
    pub const RATING: &str = "Rating";
}

use columns::*;
use ColumnKind::{Integer, Real, Text};

/// Abbreviation → descriptive column table
///
/// The site renamed `Tm` to `Team` and added `Awards` starting with the
/// 2025 season; both layouts are covered.
pub const COLUMN_MAPPINGS: &[ColumnMapping] = &[
    map("Rk", RANK, Integer),
    map("Player", PLAYER_NAME, Text),
    map("Pos", POSITION, Text),
    map("Age", AGE, Integer),
    map("Tm", TEAM, Text),
    map("Team", TEAM, Text),
    map("G", GAMES_PLAYED, Integer),
    map("GS", GAMES_STARTED, Integer),
    map("MP", MINUTES_PLAYED, Real),
    map("FG", FIELD_GOALS_MADE, Real),
    map("FGA", FIELD_GOALS_ATTEMPTED, Real),
    map("FG%", FIELD_GOAL_PCT, Real),
    map("3P", THREE_POINTERS_MADE, Real),
    map("3PA", THREE_POINTERS_ATTEMPTED, Real),
    map("3P%", THREE_POINT_PCT, Real),
    map("2P", TWO_POINTERS_MADE, Real),
    map("2PA", TWO_POINTERS_ATTEMPTED, Real),
    map("2P%", TWO_POINT_PCT, Real),
    map("eFG%", EFFECTIVE_FIELD_GOAL_PCT, Real),
    map("FT", FREE_THROWS_MADE, Real),
    map("FTA", FREE_THROWS_ATTEMPTED, Real),
    map("FT%", FREE_THROW_PCT, Real),
    map("ORB", OFFENSIVE_REBOUNDS, Real),
    map("DRB", DEFENSIVE_REBOUNDS, Real),
    map("TRB", TOTAL_REBOUNDS, Real),
    map("AST", ASSISTS, Real),
    map("STL", STEALS, Real),
    map("BLK", BLOCKS, Real),
    map("TOV", TURNOVERS, Real),
    map("PF", PERSONAL_FOULS, Real),
    map("PTS", POINTS, Real),
    map("Awards", AWARDS, Text),
];

/// Columns the rating calculator and the reports read
pub const REQUIRED_COLUMNS: &[&str] = &[
    PLAYER_NAME,
    POSITION,
    AGE,
    TEAM,
    GAMES_PLAYED,
    GAMES_STARTED,
    POINTS,
    TOTAL_REBOUNDS,
    ASSISTS,
    STEALS,
    BLOCKS,
    TURNOVERS,
    PERSONAL_FOULS,
];

/// Look up the column table entry for an abbreviation
pub fn lookup(abbreviation: &str) -> Option<&'static ColumnMapping> {
    COLUMN_MAPPINGS.iter().find(|m| m.abbreviation == abbreviation)
}

/// A typed cell value ready to be bound into an insert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl CellValue {
    /// Numeric value of the cell; text cells have none
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Text(_) => None,
            CellValue::Integer(value) => Some(*value as f64),
            CellValue::Real(value) => Some(*value),
        }
    }
}

/// A scraped header resolved against the column table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub abbreviation: String,
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Ordered store columns for one scraped table
#[derive(Debug, Clone)]
pub struct SeasonSchema {
    columns: Vec<ColumnSpec>,
}

impl SeasonSchema {
    /// Resolve scraped header abbreviations into store columns
    pub fn from_headers(headers: &[String]) -> Result<Self, SchemaError> {
        let mut columns = Vec::with_capacity(headers.len());
        let mut seen: HashMap<&'static str, &str> = HashMap::new();

        for header in headers {
            let mapping =
                lookup(header).ok_or_else(|| SchemaError::UnknownAbbreviation(header.clone()))?;

            if let Some(first) = seen.insert(mapping.column, header.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    column: mapping.column,
                    first: first.to_string(),
                    second: header.clone(),
                });
            }

            columns.push(ColumnSpec {
                abbreviation: header.clone(),
                name: mapping.column,
                kind: mapping.kind,
            });
        }

        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|required| !seen.contains_key(*required)) {
            return Err(SchemaError::MissingColumn(*missing));
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Coerce one row of cell strings into typed values
    ///
    /// Empty numeric cells become zero.
    pub fn coerce_row(&self, row: usize, cells: &[String]) -> Result<Vec<CellValue>, SchemaError> {
        if cells.len() != self.columns.len() {
            return Err(SchemaError::RowWidth {
                row,
                expected: self.columns.len(),
                found: cells.len(),
            });
        }

        self.columns
            .iter()
            .zip(cells)
            .map(|(column, raw)| coerce_cell(row, column, raw))
            .collect()
    }

    /// Coerce every row, stopping at the first bad cell
    pub fn coerce_rows(&self, rows: &[Vec<String>]) -> Result<Vec<Vec<CellValue>>, SchemaError> {
        rows.iter().enumerate().map(|(index, cells)| self.coerce_row(index, cells)).collect()
    }
}

fn coerce_cell(row: usize, column: &ColumnSpec, raw: &str) -> Result<CellValue, SchemaError> {
    let value = raw.trim();
    let invalid =
        || SchemaError::InvalidValue { row, column: column.name, value: raw.to_string() };

    match column.kind {
        ColumnKind::Text => Ok(CellValue::Text(value.to_string())),
        ColumnKind::Integer if value.is_empty() => Ok(CellValue::Integer(0)),
        ColumnKind::Integer => value.parse::<i64>().map(CellValue::Integer).map_err(|_| invalid()),
        ColumnKind::Real if value.is_empty() => Ok(CellValue::Real(0.0)),
        ColumnKind::Real => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(CellValue::Real)
            .ok_or_else(invalid),
    }
}
