//! Ranked leaderboards over a rated season
//!
//! Ordering is rating descending, then points descending, then name
//! ascending; team and row id settle anything left so the order is total.
//!
//! Overall and position boards count each player once: a traded player's
//! aggregate row (`TOT`, `2TM`, ...) stands for the whole season, otherwise
//! the row with the most games played does. Players are identified by name
//! and age. Team boards use the per-team rows only and ignore the minimum
//! games filter.

use persistence::PlayerSeasonRecord;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::config::ReportSettings;

/// The five position buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Position {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "C")]
    Center,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PointGuard,
        Position::ShootingGuard,
        Position::SmallForward,
        Position::PowerForward,
        Position::Center,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::PointGuard => "Point Guard",
            Position::ShootingGuard => "Shooting Guard",
            Position::SmallForward => "Small Forward",
            Position::PowerForward => "Power Forward",
            Position::Center => "Center",
        }
    }

    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.abbreviation() == abbreviation)
    }

    /// Bucket for a listed designation: the first position of a hyphenated
    /// combination, so "SG-SF" is a shooting guard
    pub fn primary(designation: &str) -> Option<Self> {
        let first = designation.split('-').next()?.trim();
        Self::from_abbreviation(first)
    }
}

/// Total order used by every leaderboard
pub fn compare_ranked(a: &PlayerSeasonRecord, b: &PlayerSeasonRecord) -> Ordering {
    b.rating_or_zero()
        .total_cmp(&a.rating_or_zero())
        .then_with(|| b.points.total_cmp(&a.points))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.team.cmp(&b.team))
        .then_with(|| a.row_id.cmp(&b.row_id))
}

/// One row per player for season-wide rankings
pub fn season_totals(records: &[PlayerSeasonRecord]) -> Vec<&PlayerSeasonRecord> {
    let mut chosen: Vec<&PlayerSeasonRecord> = Vec::new();
    let mut index: HashMap<(&str, i64), usize> = HashMap::new();

    for record in records {
        let key = (record.name.as_str(), record.age);
        match index.get(&key) {
            Some(&slot) => {
                if represents_season_better(record, chosen[slot]) {
                    chosen[slot] = record;
                }
            }
            None => {
                index.insert(key, chosen.len());
                chosen.push(record);
            }
        }
    }

    chosen
}

/// Whether `candidate` should replace `current` as a player's season row
fn represents_season_better(candidate: &PlayerSeasonRecord, current: &PlayerSeasonRecord) -> bool {
    match (candidate.is_aggregate(), current.is_aggregate()) {
        (true, false) => true,
        (false, true) => false,
        // Keep the first of two aggregates
        (true, true) => false,
        (false, false) => {
            candidate.games_played > current.games_played
                || (candidate.games_played == current.games_played
                    && candidate.rating_or_zero() > current.rating_or_zero())
        }
    }
}

/// A ranked leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub team: String,
    pub position: String,
    pub rating: f64,
    pub points: f64,
    pub total_rebounds: f64,
    pub assists: f64,
    pub games_played: i64,
    pub games_started: i64,
}

impl LeaderboardEntry {
    fn new(rank: usize, record: &PlayerSeasonRecord) -> Self {
        Self {
            rank,
            name: record.name.clone(),
            team: record.team.clone(),
            position: record.position.clone(),
            rating: record.rating_or_zero(),
            points: record.points,
            total_rebounds: record.total_rebounds,
            assists: record.assists,
            games_played: record.games_played,
            games_started: record.games_started,
        }
    }
}

fn ranked(records: &[&PlayerSeasonRecord], limit: usize) -> Vec<LeaderboardEntry> {
    records
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, record)| LeaderboardEntry::new(index + 1, record))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionBoard {
    pub position: Position,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBoard {
    pub team: String,
    pub entries: Vec<LeaderboardEntry>,
}

/// Every leaderboard for one season
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonLeaderboards {
    pub season: u16,
    pub min_games: i64,
    pub overall: Vec<LeaderboardEntry>,
    pub by_position: Vec<PositionBoard>,
    pub by_team: Vec<TeamBoard>,
}

/// Builds leaderboards from rated records
pub struct LeaderboardBuilder {
    settings: ReportSettings,
}

impl LeaderboardBuilder {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// De-duplicated players meeting the minimum games, in ranked order
    pub fn eligible<'a>(&self, records: &'a [PlayerSeasonRecord]) -> Vec<&'a PlayerSeasonRecord> {
        let mut eligible: Vec<&PlayerSeasonRecord> = season_totals(records)
            .into_iter()
            .filter(|r| r.games_played >= self.settings.min_games)
            .collect();
        eligible.sort_by(|a, b| compare_ranked(a, b));
        eligible
    }

    pub fn overall(&self, records: &[PlayerSeasonRecord]) -> Vec<LeaderboardEntry> {
        ranked(&self.eligible(records), self.settings.overall_limit)
    }

    /// Eligible players split by primary position, untruncated
    ///
    /// Players whose position cannot be resolved are left out.
    pub fn position_buckets<'a>(
        &self,
        records: &'a [PlayerSeasonRecord],
    ) -> BTreeMap<Position, Vec<&'a PlayerSeasonRecord>> {
        let mut buckets: BTreeMap<Position, Vec<&PlayerSeasonRecord>> =
            Position::ALL.into_iter().map(|p| (p, Vec::new())).collect();

        for record in self.eligible(records) {
            if let Some(position) = Position::primary(&record.position) {
                buckets.entry(position).or_default().push(record);
            }
        }

        buckets
    }

    pub fn by_position(&self, records: &[PlayerSeasonRecord]) -> Vec<PositionBoard> {
        self.position_buckets(records)
            .into_iter()
            .map(|(position, players)| PositionBoard {
                position,
                entries: ranked(&players, self.settings.position_limit),
            })
            .collect()
    }

    /// Per-team boards over the non-aggregate rows, teams in alphabetical order
    pub fn by_team(&self, records: &[PlayerSeasonRecord]) -> Vec<TeamBoard> {
        let mut teams: BTreeMap<&str, Vec<&PlayerSeasonRecord>> = BTreeMap::new();
        for record in records.iter().filter(|r| !r.is_aggregate()) {
            teams.entry(record.team.as_str()).or_default().push(record);
        }

        teams
            .into_iter()
            .map(|(team, mut players)| {
                players.sort_by(|a, b| compare_ranked(a, b));
                TeamBoard { team: team.to_string(), entries: ranked(&players, self.settings.team_limit) }
            })
            .collect()
    }

    pub fn build(&self, season: u16, records: &[PlayerSeasonRecord]) -> SeasonLeaderboards {
        SeasonLeaderboards {
            season,
            min_games: self.settings.min_games,
            overall: self.overall(records),
            by_position: self.by_position(records),
            by_team: self.by_team(records),
        }
    }
}
