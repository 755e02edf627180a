//! # Forecast Math
//!
//! Numerical building blocks shared by the forecasting models.
//! This crate provides trailing-window statistics, lag construction and gap
//! filling for feature engineering, differencing polynomials for seasonal
//! ARIMA, and a bounded Nelder-Mead optimiser for parameter estimation.

use thiserror::Error;

pub mod differencing;
pub mod moving_averages;
pub mod optimization;
pub mod statistics;

/// Errors that can occur in forecasting-related calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = MathError::InsufficientData("need 2 points".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 2 points"
        );
    }
}
