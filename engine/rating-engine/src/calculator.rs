use persistence::schema::columns::{
    ASSISTS, BLOCKS, GAMES_PLAYED, PERSONAL_FOULS, POINTS, STEALS, TOTAL_REBOUNDS, TURNOVERS,
};
use persistence::{CellValue, PlayerSeasonRecord, SeasonSchema};
use serde::{Deserialize, Serialize};

/// Coefficients of the efficiency rating
///
/// ```text
/// rating = points*PTS + rebounds*TRB + assists*AST + steals*STL + blocks*BLK
///        - turnovers*TOV - personal_fouls*PF
/// ```
///
/// All weights are magnitudes; turnovers and fouls are subtracted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingWeights {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub personal_fouls: f64,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            points: 1.0,
            rebounds: 1.2,
            assists: 1.5,
            steals: 2.0,
            blocks: 2.0,
            turnovers: 2.0,
            personal_fouls: 0.5,
        }
    }
}

impl RatingWeights {
    /// Reject weights that would break monotonicity of the rating
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("points", self.points),
            ("rebounds", self.rebounds),
            ("assists", self.assists),
            ("steals", self.steals),
            ("blocks", self.blocks),
            ("turnovers", self.turnovers),
            ("personal_fouls", self.personal_fouls),
        ];

        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("Rating weight {name} must be a finite non-negative number, got {value}"));
            }
        }

        Ok(())
    }
}

/// Counting statistics that feed the rating
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatLine {
    pub points: f64,
    pub total_rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub personal_fouls: f64,
}

impl From<&PlayerSeasonRecord> for StatLine {
    fn from(record: &PlayerSeasonRecord) -> Self {
        Self {
            points: record.points,
            total_rebounds: record.total_rebounds,
            assists: record.assists,
            steals: record.steals,
            blocks: record.blocks,
            turnovers: record.turnovers,
            personal_fouls: record.personal_fouls,
        }
    }
}

/// Rating assigned to players who never appeared in a game
pub const NO_GAMES_RATING: f64 = 0.0;

/// Efficiency rating calculator
pub struct RatingCalculator {
    weights: RatingWeights,
}

impl RatingCalculator {
    /// Create a new rating calculator
    pub fn new(weights: RatingWeights) -> Self {
        Self { weights }
    }

    /// Rating for a stat line; players without games get [`NO_GAMES_RATING`]
    pub fn rate(&self, games_played: i64, stats: &StatLine) -> f64 {
        if games_played <= 0 {
            return NO_GAMES_RATING;
        }

        let w = &self.weights;
        w.points * stats.points
            + w.rebounds * stats.total_rebounds
            + w.assists * stats.assists
            + w.steals * stats.steals
            + w.blocks * stats.blocks
            - w.turnovers * stats.turnovers
            - w.personal_fouls * stats.personal_fouls
    }

    pub fn rate_record(&self, record: &PlayerSeasonRecord) -> f64 {
        self.rate(record.games_played, &StatLine::from(record))
    }

    /// `(row_id, rating)` for every record
    pub fn rate_all(&self, records: &[PlayerSeasonRecord]) -> Vec<(i64, f64)> {
        records.iter().map(|record| (record.row_id, self.rate_record(record))).collect()
    }

    /// Ratings for freshly mapped rows, aligned with `rows`
    ///
    /// Columns missing from the schema count as zero.
    pub fn rate_rows(&self, schema: &SeasonSchema, rows: &[Vec<CellValue>]) -> Vec<f64> {
        let [games, points, rebounds, assists, steals, blocks, turnovers, fouls] =
            [GAMES_PLAYED, POINTS, TOTAL_REBOUNDS, ASSISTS, STEALS, BLOCKS, TURNOVERS, PERSONAL_FOULS]
                .map(|name| schema.index_of(name));

        rows.iter()
            .map(|cells| {
                let value = |column: Option<usize>| {
                    column.and_then(|i| cells.get(i)).and_then(CellValue::as_f64).unwrap_or(0.0)
                };
                let stats = StatLine {
                    points: value(points),
                    total_rebounds: value(rebounds),
                    assists: value(assists),
                    steals: value(steals),
                    blocks: value(blocks),
                    turnovers: value(turnovers),
                    personal_fouls: value(fouls),
                };
                self.rate(value(games) as i64, &stats)
            })
            .collect()
    }
}
