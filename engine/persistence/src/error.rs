//! Error types for the persistence layer

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while reading or writing a season store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database errors (connection, statement, transaction)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (data directory, store files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The season's players have not been rated yet
    #[error("Season {0} has unrated players")]
    NotRated(u16),

    /// Invalid operation for current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl StoreError {
    /// Create a new not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}

/// Errors raised while mapping scraped headers and cells onto store columns
///
/// These indicate a gap in the column table or malformed source data and
/// halt the season rather than dropping data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A header abbreviation has no entry in the column table
    #[error("Unmapped column abbreviation '{0}'")]
    UnknownAbbreviation(String),

    /// Two headers map onto the same column
    #[error("Headers '{first}' and '{second}' both map to column {column}")]
    DuplicateColumn { column: &'static str, first: String, second: String },

    /// A column needed for rating or reporting is absent
    #[error("Required column {0} is missing from the scraped headers")]
    MissingColumn(&'static str),

    /// A row does not have one cell per header
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, expected: usize, found: usize },

    /// A numeric cell could not be parsed
    #[error("Row {row}, column {column}: '{value}' is not a number")]
    InvalidValue { row: usize, column: &'static str, value: String },
}
