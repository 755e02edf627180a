//! Summary statistics over plain slices

use crate::{MathError, Result};
use statrs::statistics::Statistics;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty slice".to_string(),
        ));
    }
    Ok(values.mean())
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let std_dev = values.std_dev();
    if !std_dev.is_finite() {
        return Err(MathError::CalculationError(
            "Standard deviation is not finite".to_string(),
        ));
    }
    Ok(std_dev)
}
