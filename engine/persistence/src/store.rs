//! SQLite-backed season store
//!
//! One file per season holding a `players` table (one column per mapped
//! header plus `Rating`) and a one-row `scrape_metadata` table.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::records::{PlayerSeasonRecord, ScrapeMetadata};
use crate::schema::columns::*;
use crate::schema::{CellValue, SeasonSchema};

const PLAYERS_TABLE: &str = "players";
const METADATA_TABLE: &str = "scrape_metadata";

/// Columns read into a [`PlayerSeasonRecord`], with the literal selected
/// when a column is absent from the stored table
const RECORD_COLUMNS: &[(&str, &str)] = &[
    (PLAYER_NAME, "''"),
    (POSITION, "''"),
    (TEAM, "''"),
    (AGE, "0"),
    (GAMES_PLAYED, "0"),
    (GAMES_STARTED, "0"),
    (MINUTES_PLAYED, "0.0"),
    (FIELD_GOALS_MADE, "0.0"),
    (FIELD_GOALS_ATTEMPTED, "0.0"),
    (THREE_POINTERS_MADE, "0.0"),
    (THREE_POINTERS_ATTEMPTED, "0.0"),
    (FREE_THROWS_MADE, "0.0"),
    (FREE_THROWS_ATTEMPTED, "0.0"),
    (OFFENSIVE_REBOUNDS, "0.0"),
    (DEFENSIVE_REBOUNDS, "0.0"),
    (TOTAL_REBOUNDS, "0.0"),
    (ASSISTS, "0.0"),
    (STEALS, "0.0"),
    (BLOCKS, "0.0"),
    (TURNOVERS, "0.0"),
    (PERSONAL_FOULS, "0.0"),
    (POINTS, "0.0"),
];

/// Store for one season's player table
pub struct SeasonStore {
    season: u16,
    path: PathBuf,
    pool: SqlitePool,
}

impl SeasonStore {
    /// Open the season's store, creating the file if needed
    pub async fn open(config: &StoreConfig, season: u16) -> Result<Self> {
        config.validate().map_err(StoreError::invalid_operation)?;
        tokio::fs::create_dir_all(config.data_dir()).await?;

        Self::connect(config.store_path(season), season, true).await
    }

    /// Open the season's store only if it already exists
    pub async fn open_existing(config: &StoreConfig, season: u16) -> Result<Self> {
        let path = config.store_path(season);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::not_found(format!(
                "No store for season {season} at {}",
                path.display()
            )));
        }

        Self::connect(path, season, false).await
    }

    async fn connect(path: PathBuf, season: u16, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(create);

        // A single connection keeps every statement of a season on one handle
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;

        debug!("Opened store for season {} at {:?}", season, path);
        Ok(Self { season, path, pool })
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the season's table with freshly scraped, unrated rows
    ///
    /// Drop, create, insert and metadata rewrite run in one transaction; if
    /// anything fails the previous table is left untouched.
    pub async fn replace_season(
        &self,
        schema: &SeasonSchema,
        rows: &[Vec<CellValue>],
        source_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<ScrapeMetadata> {
        self.replace_rows(schema, rows, None, source_url, scraped_at).await
    }

    /// Replace the season's table with rows and their ratings in one transaction
    ///
    /// `ratings[i]` belongs to `rows[i]`. The store never holds the new rows
    /// without their ratings.
    pub async fn replace_rated_season(
        &self,
        schema: &SeasonSchema,
        rows: &[Vec<CellValue>],
        ratings: &[f64],
        source_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<ScrapeMetadata> {
        if ratings.len() != rows.len() {
            return Err(StoreError::invalid_operation(format!(
                "{} ratings for {} rows",
                ratings.len(),
                rows.len()
            )));
        }

        self.replace_rows(schema, rows, Some(ratings), source_url, scraped_at).await
    }

    async fn replace_rows(
        &self,
        schema: &SeasonSchema,
        rows: &[Vec<CellValue>],
        ratings: Option<&[f64]>,
        source_url: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<ScrapeMetadata> {
        let column_defs: Vec<String> = schema
            .columns()
            .iter()
            .map(|c| format!("\"{}\" {}", c.name, c.kind.sql_type()))
            .chain(std::iter::once(format!("\"{RATING}\" REAL")))
            .collect();
        let create_sql = format!("CREATE TABLE {PLAYERS_TABLE} ({})", column_defs.join(", "));

        let column_names: Vec<String> = schema
            .columns()
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .chain(std::iter::once(format!("\"{RATING}\"")))
            .collect();
        let placeholders = vec!["?"; column_names.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {PLAYERS_TABLE} ({}) VALUES ({placeholders})",
            column_names.join(", ")
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {PLAYERS_TABLE}")).execute(&mut *tx).await?;
        sqlx::query(&create_sql).execute(&mut *tx).await?;

        for (index, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(StoreError::invalid_operation(format!(
                    "Row {index} has {} values for {} columns",
                    row.len(),
                    schema.len()
                )));
            }

            let mut query = sqlx::query(&insert_sql);
            for cell in row {
                query = match cell {
                    CellValue::Text(value) => query.bind(value.as_str()),
                    CellValue::Integer(value) => query.bind(*value),
                    CellValue::Real(value) => query.bind(*value),
                };
            }
            let rating = ratings.map(|r| r[index]);
            query.bind(rating).execute(&mut *tx).await?;
        }

        let metadata = ScrapeMetadata {
            season: self.season,
            source_url: source_url.to_string(),
            scraped_at,
            row_count: rows.len() as i64,
        };

        sqlx::query(&format!("DROP TABLE IF EXISTS {METADATA_TABLE}")).execute(&mut *tx).await?;
        sqlx::query(&format!(
            "CREATE TABLE {METADATA_TABLE} (season INTEGER NOT NULL, source_url TEXT NOT NULL, \
             scraped_at TEXT NOT NULL, row_count INTEGER NOT NULL)"
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "INSERT INTO {METADATA_TABLE} (season, source_url, scraped_at, row_count) VALUES (?, ?, ?, ?)"
        ))
        .bind(i64::from(metadata.season))
        .bind(&metadata.source_url)
        .bind(metadata.scraped_at)
        .bind(metadata.row_count)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Stored {} rows with {} columns for season {} in {:?}",
            rows.len(),
            schema.len(),
            self.season,
            self.path
        );

        Ok(metadata)
    }

    /// Whether a table exists in the store
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Column names of the players table, in table order
    pub async fn column_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(PLAYERS_TABLE)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(|row| row.try_get::<String, _>("name").map_err(StoreError::from)).collect()
    }

    async fn ensure_players_table(&self) -> Result<()> {
        if self.table_exists(PLAYERS_TABLE).await? {
            Ok(())
        } else {
            Err(StoreError::not_found(format!("Season {} has not been scraped", self.season)))
        }
    }

    /// Number of stored player rows
    pub async fn record_count(&self) -> Result<i64> {
        self.ensure_players_table().await?;

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {PLAYERS_TABLE}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Load every stored row in insertion order
    pub async fn load_records(&self) -> Result<Vec<PlayerSeasonRecord>> {
        let available = self.column_names().await?;
        if available.is_empty() {
            return Err(StoreError::not_found(format!("Season {} has not been scraped", self.season)));
        }

        let select_list: Vec<String> = RECORD_COLUMNS
            .iter()
            .map(|(name, fallback)| {
                if available.iter().any(|c| c == name) {
                    format!("\"{name}\"")
                } else {
                    format!("{fallback} AS \"{name}\"")
                }
            })
            .collect();

        let sql = format!(
            "SELECT rowid AS row_id, {}, \"{RATING}\" FROM {PLAYERS_TABLE} ORDER BY rowid",
            select_list.join(", ")
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(|row| self.record_from_row(row))
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        debug!("Loaded {} records for season {}", records.len(), self.season);
        Ok(records)
    }

    /// Load every row, failing if any row is still unrated
    pub async fn load_rated_records(&self) -> Result<Vec<PlayerSeasonRecord>> {
        let records = self.load_records().await?;
        if records.iter().any(|r| r.rating.is_none()) {
            return Err(StoreError::NotRated(self.season));
        }
        Ok(records)
    }

    fn record_from_row(&self, row: &SqliteRow) -> sqlx::Result<PlayerSeasonRecord> {
        Ok(PlayerSeasonRecord {
            row_id: row.try_get("row_id")?,
            season: self.season,
            name: row.try_get(PLAYER_NAME)?,
            position: row.try_get(POSITION)?,
            team: row.try_get(TEAM)?,
            age: row.try_get(AGE)?,
            games_played: row.try_get(GAMES_PLAYED)?,
            games_started: row.try_get(GAMES_STARTED)?,
            minutes: row.try_get(MINUTES_PLAYED)?,
            field_goals_made: row.try_get(FIELD_GOALS_MADE)?,
            field_goals_attempted: row.try_get(FIELD_GOALS_ATTEMPTED)?,
            three_pointers_made: row.try_get(THREE_POINTERS_MADE)?,
            three_pointers_attempted: row.try_get(THREE_POINTERS_ATTEMPTED)?,
            free_throws_made: row.try_get(FREE_THROWS_MADE)?,
            free_throws_attempted: row.try_get(FREE_THROWS_ATTEMPTED)?,
            offensive_rebounds: row.try_get(OFFENSIVE_REBOUNDS)?,
            defensive_rebounds: row.try_get(DEFENSIVE_REBOUNDS)?,
            total_rebounds: row.try_get(TOTAL_REBOUNDS)?,
            assists: row.try_get(ASSISTS)?,
            steals: row.try_get(STEALS)?,
            blocks: row.try_get(BLOCKS)?,
            turnovers: row.try_get(TURNOVERS)?,
            personal_fouls: row.try_get(PERSONAL_FOULS)?,
            points: row.try_get(POINTS)?,
            rating: row.try_get(RATING)?,
        })
    }

    /// Write ratings back by rowid in one transaction
    pub async fn write_ratings(&self, ratings: &[(i64, f64)]) -> Result<usize> {
        self.ensure_players_table().await?;

        let sql = format!("UPDATE {PLAYERS_TABLE} SET \"{RATING}\" = ? WHERE rowid = ?");
        let mut tx = self.pool.begin().await?;

        for (row_id, rating) in ratings {
            let result = sqlx::query(&sql).bind(*rating).bind(*row_id).execute(&mut *tx).await?;
            if result.rows_affected() != 1 {
                return Err(StoreError::invalid_operation(format!(
                    "No row {row_id} in season {} to rate",
                    self.season
                )));
            }
        }

        tx.commit().await?;
        Ok(ratings.len())
    }

    /// Whether every stored row carries a rating
    pub async fn is_rated(&self) -> Result<bool> {
        if !self.table_exists(PLAYERS_TABLE).await? {
            return Ok(false);
        }

        let (total, unrated): (i64, i64) = sqlx::query_as(&format!(
            "SELECT COUNT(*), COUNT(*) - COUNT(\"{RATING}\") FROM {PLAYERS_TABLE}"
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(total > 0 && unrated == 0)
    }

    /// Provenance of the stored table, if the season has been scraped
    pub async fn metadata(&self) -> Result<Option<ScrapeMetadata>> {
        if !self.table_exists(METADATA_TABLE).await? {
            return Ok(None);
        }

        let row = sqlx::query(&format!(
            "SELECT season, source_url, scraped_at, row_count FROM {METADATA_TABLE} LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let season: i64 = row.try_get("season")?;
        let season = u16::try_from(season).map_err(|_| {
            StoreError::invalid_operation(format!("Stored season {season} is out of range"))
        })?;

        Ok(Some(ScrapeMetadata {
            season,
            source_url: row.try_get("source_url")?,
            scraped_at: row.try_get("scraped_at")?,
            row_count: row.try_get("row_count")?,
        }))
    }

    /// Close the underlying pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADERS: &[&str] =
        &["Player", "Pos", "Age", "Tm", "G", "GS", "MP", "TRB", "AST", "STL", "BLK", "TOV", "PF", "PTS"];

    fn schema() -> SeasonSchema {
        let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        SeasonSchema::from_headers(&headers).unwrap()
    }

    fn row(name: &str, team: &str, games: i64, points: f64) -> Vec<CellValue> {
        vec![
            CellValue::Text(name.to_string()),
            CellValue::Text("PG".to_string()),
            CellValue::Integer(25),
            CellValue::Text(team.to_string()),
            CellValue::Integer(games),
            CellValue::Integer(games / 2),
            CellValue::Real(30.0),
            CellValue::Real(4.5),
            CellValue::Real(6.0),
            CellValue::Real(1.0),
            CellValue::Real(0.5),
            CellValue::Real(2.0),
            CellValue::Real(2.5),
            CellValue::Real(points),
        ]
    }

    async fn open_store(dir: &TempDir) -> SeasonStore {
        SeasonStore::open(&StoreConfig::new(dir.path()), 2024).await.unwrap()
    }

    #[tokio::test]
    async fn test_replace_and_load() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let rows = vec![row("Alpha", "BOS", 70, 21.5), row("Beta", "LAL", 40, 9.0)];

        let metadata = store.replace_season(&schema(), &rows, "http://test", Utc::now()).await.unwrap();
        assert_eq!(metadata.row_count, 2);

        let records = store.load_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(records[0].team, "BOS");
        assert_eq!(records[0].games_played, 70);
        assert_eq!(records[0].points, 21.5);
        assert_eq!(records[0].total_rebounds, 4.5);
        assert_eq!(records[0].season, 2024);
        assert_eq!(records[0].rating, None);
        // Not part of this layout, selected as zero
        assert_eq!(records[0].field_goals_attempted, 0.0);

        let columns = store.column_names().await.unwrap();
        assert_eq!(columns.first().map(String::as_str), Some("PlayerName"));
        assert_eq!(columns.last().map(String::as_str), Some("Rating"));
        assert_eq!(columns.len(), HEADERS.len() + 1);

        assert!(store.path().ends_with("nba_database_2024.db"));
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_replace_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let rows = vec![row("Alpha", "BOS", 70, 21.5), row("Beta", "LAL", 40, 9.0)];

        store.replace_season(&schema(), &rows, "http://test", Utc::now()).await.unwrap();
        let first = store.load_records().await.unwrap();

        store.replace_season(&schema(), &rows, "http://test", Utc::now()).await.unwrap();
        let second = store.load_records().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_table() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let good = vec![row("Alpha", "BOS", 70, 21.5)];
        store.replace_season(&schema(), &good, "http://test", Utc::now()).await.unwrap();

        let mut short = row("Broken", "NYK", 10, 1.0);
        short.pop();
        let bad = vec![row("Gamma", "MIA", 60, 11.0), short];

        let err = store.replace_season(&schema(), &bad, "http://test", Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));

        let records = store.load_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(store.metadata().await.unwrap().unwrap().row_count, 1);
    }

    #[tokio::test]
    async fn test_write_ratings() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let rows = vec![row("Alpha", "BOS", 70, 21.5), row("Beta", "LAL", 40, 9.0)];
        store.replace_season(&schema(), &rows, "http://test", Utc::now()).await.unwrap();
        assert!(!store.is_rated().await.unwrap());
        assert!(matches!(store.load_rated_records().await, Err(StoreError::NotRated(2024))));

        let records = store.load_records().await.unwrap();
        let ratings: Vec<(i64, f64)> = records.iter().map(|r| (r.row_id, r.points * 2.0)).collect();
        assert_eq!(store.write_ratings(&ratings).await.unwrap(), 2);

        assert!(store.is_rated().await.unwrap());
        let rated = store.load_rated_records().await.unwrap();
        assert_eq!(rated[0].rating, Some(43.0));
        assert_eq!(rated[1].rating, Some(18.0));
    }

    #[tokio::test]
    async fn test_write_rating_for_unknown_row_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        store.replace_season(&schema(), &[row("Alpha", "BOS", 70, 21.5)], "http://test", Utc::now())
            .await
            .unwrap();

        let err = store.write_ratings(&[(1, 5.0), (99, 1.0)]).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));
        // The whole batch rolled back
        assert!(!store.is_rated().await.unwrap());
        assert_eq!(store.load_records().await.unwrap()[0].rating, None);
    }

    #[tokio::test]
    async fn test_replace_rated_season_stores_ratings() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let rows = vec![row("Alpha", "BOS", 70, 21.5), row("Beta", "LAL", 40, 9.0)];

        store
            .replace_rated_season(&schema(), &rows, &[31.25, 12.0], "http://test", Utc::now())
            .await
            .unwrap();

        assert!(store.is_rated().await.unwrap());
        let records = store.load_rated_records().await.unwrap();
        assert_eq!(records[0].rating, Some(31.25));
        assert_eq!(records[1].rating, Some(12.0));
    }

    #[tokio::test]
    async fn test_replace_rated_season_rejects_missing_ratings() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let first = vec![row("Alpha", "BOS", 70, 21.5)];
        store.replace_rated_season(&schema(), &first, &[30.0], "http://test", Utc::now()).await.unwrap();

        let second = vec![row("Gamma", "MIA", 60, 11.0), row("Delta", "NYK", 55, 8.0)];
        let err = store
            .replace_rated_season(&schema(), &second, &[20.0], "http://test", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidOperation(_)));

        // The earlier rated table is still served
        let records = store.load_rated_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alpha");
        assert_eq!(records[0].rating, Some(30.0));
    }

    #[tokio::test]
    async fn test_metadata_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        assert!(store.metadata().await.unwrap().is_none());

        let scraped_at = Utc::now();
        store.replace_season(&schema(), &[row("Alpha", "BOS", 70, 21.5)], "http://src", scraped_at)
            .await
            .unwrap();

        let metadata = store.metadata().await.unwrap().unwrap();
        assert_eq!(metadata.season, 2024);
        assert_eq!(metadata.source_url, "http://src");
        assert_eq!(metadata.row_count, 1);
        assert_eq!(metadata.scraped_at.timestamp(), scraped_at.timestamp());
    }

    #[tokio::test]
    async fn test_unscraped_store() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(matches!(store.load_records().await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.record_count().await, Err(StoreError::NotFound(_))));
        assert!(!store.is_rated().await.unwrap());
    }

    #[tokio::test]
    async fn test_open_existing_requires_file() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path());

        let err = SeasonStore::open_existing(&config, 2019).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound(_)));

        SeasonStore::open(&config, 2019).await.unwrap().close().await;
        let store = SeasonStore::open_existing(&config, 2019).await.unwrap();
        assert_eq!(store.season(), 2019);
    }
}
