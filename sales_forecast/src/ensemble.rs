//! Merging of the classical and regression forecasts

use crate::config::EnsembleConfig;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastPoint, ModelOutcome};

/// Combine the two model outcomes into the final forecast.
///
/// With one forecast available it is returned unchanged. With both, days are
/// merged pairwise: mean sales, floored mean bookings, the wider of the two
/// intervals, and the ensemble accuracy label.
pub fn combine(
    classical: ModelOutcome,
    regression: ModelOutcome,
    config: &EnsembleConfig,
) -> Result<Vec<ForecastPoint>> {
    match (classical, regression) {
        (ModelOutcome::Unavailable(_), ModelOutcome::Unavailable(_)) => Ok(Vec::new()),
        (ModelOutcome::Forecast(points), ModelOutcome::Unavailable(_))
        | (ModelOutcome::Unavailable(_), ModelOutcome::Forecast(points)) => Ok(points),
        (ModelOutcome::Forecast(classical), ModelOutcome::Forecast(regression)) => {
            merge(&classical, &regression, config)
        }
    }
}

fn merge(
    classical: &[ForecastPoint],
    regression: &[ForecastPoint],
    config: &EnsembleConfig,
) -> Result<Vec<ForecastPoint>> {
    if classical.len() != regression.len() {
        return Err(ForecastError::Precondition(format!(
            "Cannot merge forecasts of {} and {} days",
            classical.len(),
            regression.len()
        )));
    }

    classical
        .iter()
        .zip(regression)
        .map(|(a, b)| {
            if a.date != b.date {
                return Err(ForecastError::Precondition(format!(
                    "Forecast dates disagree: {} vs {}",
                    a.date, b.date
                )));
            }
            Ok(ForecastPoint {
                date: a.date,
                predicted_sales: (a.predicted_sales + b.predicted_sales) / 2.0,
                predicted_bookings: (a.predicted_bookings + b.predicted_bookings) / 2,
                confidence_lower: a.confidence_lower.min(b.confidence_lower),
                confidence_upper: a.confidence_upper.max(b.confidence_upper),
                accuracy_score: config.accuracy_score,
            })
        })
        .collect()
}
