//! Error types for the sales_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the sales_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A tabular source lacks required columns
    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// A row of an explicit file source could not be parsed
    #[error("Parse error at row {row}: {message}")]
    ParseError { row: usize, message: String },

    /// The structured source could not be reached or queried
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Too little history for a model
    #[error("Insufficient data for {model}: need at least {required} rows, have {available}")]
    InsufficientData {
        model: String,
        required: usize,
        available: usize,
    },

    /// Numerical failure while fitting a model
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Broken contract between pipeline stages
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from CSV output
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from the SQLite source
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Error from the numerical helpers
    #[error("Math error: {0}")]
    MathError(#[from] forecast_math::MathError),
}

impl ForecastError {
    /// Whether this error means "this model cannot produce a forecast" rather
    /// than a fault of the whole run.
    pub fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. } | ForecastError::ModelFit(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
