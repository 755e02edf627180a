//! Error types for the market_basket crate

use thiserror::Error;

/// Custom error types for the market_basket crate
#[derive(Debug, Error)]
pub enum BasketError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A row of the transaction source could not be parsed
    #[error("Parse error at row {row}: {message}")]
    ParseError { row: usize, message: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV source
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from the SQLite source
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Error from JSON output
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, BasketError>;
