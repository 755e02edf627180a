//! Gradient-boosted regression trees over calendar and sales-history features

use crate::config::BoostingConfig;
use crate::error::{ForecastError, Result};
use crate::features::{forecast_dates, FeatureVector, LagState};
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{ForecastModel, ForecastPoint, TrainedForecastModel, TrainingData};
use chrono::NaiveDate;
use forecast_math::statistics::mean;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Least-squares gradient boosting over [`RegressionTree`] stages
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    /// Fit `n_estimators` trees, each on the residuals of the stages before it
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], config: &BoostingConfig) -> Result<Self> {
        if rows.len() != targets.len() {
            return Err(ForecastError::Precondition(format!(
                "{} feature rows for {} targets",
                rows.len(),
                targets.len()
            )));
        }
        let finite = targets.iter().all(|v| v.is_finite())
            && rows.iter().flatten().all(|v| v.is_finite());
        if !finite {
            return Err(ForecastError::ModelFit(
                "Training data contains non-finite values".to_string(),
            ));
        }

        let init = mean(targets)
            .map_err(|e| ForecastError::ModelFit(format!("Cannot fit on empty data: {}", e)))?;
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        };
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut fitted = vec![init; targets.len()];
        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators {
            let residuals: Vec<f64> = targets.iter().zip(&fitted).map(|(y, f)| y - f).collect();
            let tree = RegressionTree::fit(rows, &residuals, &params, &mut rng);
            for (estimate, row) in fitted.iter_mut().zip(rows) {
                *estimate += config.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            init,
            learning_rate: config.learning_rate,
            trees,
        })
    }

    /// Prediction for one row
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Gradient-boosting forecaster for daily sales and bookings
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    /// Name of the model
    name: String,
    config: BoostingConfig,
}

/// Trained gradient-boosting forecaster
#[derive(Debug, Clone)]
pub struct TrainedGradientBoosting {
    /// Name of the model
    name: String,
    config: BoostingConfig,
    sales: GradientBoostingRegressor,
    bookings: GradientBoostingRegressor,
    /// History of the last observed day
    seed: LagState,
    last_date: NaiveDate,
}

impl GradientBoostingModel {
    /// Create a new gradient-boosting forecaster
    pub fn new(config: BoostingConfig) -> Self {
        Self {
            name: format!(
                "GradientBoosting(n={}, depth={}, lr={})",
                config.n_estimators, config.max_depth, config.learning_rate
            ),
            config,
        }
    }
}

impl ForecastModel for GradientBoostingModel {
    type Trained = TrainedGradientBoosting;

    fn train(&self, data: &TrainingData<'_>) -> Result<TrainedGradientBoosting> {
        let features = data.features;
        let complete = features.complete_history_rows();
        if complete < self.config.min_complete_rows {
            return Err(ForecastError::InsufficientData {
                model: self.name.clone(),
                required: self.config.min_complete_rows,
                available: complete,
            });
        }
        if features.len() != data.series.len() {
            return Err(ForecastError::Precondition(format!(
                "{} feature rows for a {}-day series",
                features.len(),
                data.series.len()
            )));
        }
        let last = features.last().ok_or_else(|| {
            ForecastError::Precondition("Feature table has no rows".to_string())
        })?;

        let rows = features.matrix();
        let sales = GradientBoostingRegressor::fit(&rows, &data.series.sales(), &self.config)?;
        let bookings =
            GradientBoostingRegressor::fit(&rows, &data.series.travelers(), &self.config)?;
        debug!(model = %self.name, rows = rows.len(), "trained sales and bookings regressors");

        Ok(TrainedGradientBoosting {
            name: self.name.clone(),
            config: self.config.clone(),
            sales,
            bookings,
            seed: last.history(),
            last_date: last.date,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedGradientBoosting {
    /// Forecast for a single day from the given history
    pub fn predict_day(&self, date: NaiveDate, history: &LagState) -> ForecastPoint {
        let (point, _) = self.step(date, history);
        point
    }

    /// Point for `date` and the unclamped sales prediction
    fn step(&self, date: NaiveDate, history: &LagState) -> (ForecastPoint, f64) {
        let row = FeatureVector::for_date(date, history).to_row();
        let raw_sales = self.sales.predict(&row);
        let raw_bookings = self.bookings.predict(&row);

        let predicted_sales = raw_sales.max(0.0);
        let fraction = self.config.interval_fraction;
        let point = ForecastPoint {
            date,
            predicted_sales,
            predicted_bookings: raw_bookings.trunc().max(1.0) as u64,
            confidence_lower: predicted_sales * (1.0 - fraction),
            confidence_upper: predicted_sales * (1.0 + fraction),
            accuracy_score: self.config.accuracy_score,
        };
        (point, raw_sales)
    }

    /// Roll forward one day at a time. Only the short lag is refreshed, with
    /// the raw sales prediction; the long lag and both trailing means keep
    /// their values from the last observed day.
    pub fn forecast_iterative(&self, horizon: usize) -> Vec<ForecastPoint> {
        let (points, _) = forecast_dates(self.last_date, horizon).into_iter().fold(
            (Vec::with_capacity(horizon), self.seed),
            |(mut points, history), date| {
                let (point, raw_sales) = self.step(date, &history);
                points.push(point);
                (points, history.with_lag_7(raw_sales))
            },
        );
        points
    }

    pub fn seed(&self) -> &LagState {
        &self.seed
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }
}

impl TrainedForecastModel for TrainedGradientBoosting {
    fn forecast(&self, horizon: usize) -> Result<Vec<ForecastPoint>> {
        let points = self.forecast_iterative(horizon);
        if points
            .iter()
            .any(|p| !p.predicted_sales.is_finite() || !p.confidence_upper.is_finite())
        {
            return Err(ForecastError::ModelFit(
                "Forecast is not finite".to_string(),
            ));
        }
        Ok(points)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TransactionRecord;
    use crate::features::{aggregate, build_features};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn small_config() -> BoostingConfig {
        BoostingConfig {
            n_estimators: 20,
            max_depth: 3,
            ..BoostingConfig::default()
        }
    }

    fn records(days: u32) -> Vec<TransactionRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start
            .iter_days()
            .take(days as usize)
            .enumerate()
            .map(|(i, date)| {
                TransactionRecord::new(date, 1000.0 + 100.0 * (i % 7) as f64, 1 + (i % 5) as u32)
            })
            .collect()
    }

    #[test]
    fn test_regressor_fits_linear_target() {
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..50).map(|i| 2.0 * i as f64).collect();
        let model = GradientBoostingRegressor::fit(&rows, &targets, &BoostingConfig::default())
            .unwrap();

        assert_eq!(model.n_trees(), 100);
        assert_relative_eq!(model.predict(&[25.0]), 50.0, epsilon = 2.0);
    }

    #[test]
    fn test_regressor_is_deterministic() {
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets: Vec<f64> = (0..30).map(|i| ((i * 7) % 11) as f64).collect();
        let a = GradientBoostingRegressor::fit(&rows, &targets, &small_config()).unwrap();
        let b = GradientBoostingRegressor::fit(&rows, &targets, &small_config()).unwrap();
        for row in &rows {
            assert_eq!(a.predict(row), b.predict(row));
        }
    }

    #[test]
    fn test_non_finite_target_is_fit_failure() {
        let rows = vec![vec![1.0], vec![2.0]];
        let err = GradientBoostingRegressor::fit(&rows, &[1.0, f64::NAN], &small_config())
            .unwrap_err();
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn test_insufficient_complete_rows() {
        let series = aggregate(&records(38));
        let features = build_features(&series).unwrap();
        let data = TrainingData {
            series: &series,
            features: &features,
        };

        let err = GradientBoostingModel::new(small_config())
            .train(&data)
            .unwrap_err();
        match err {
            ForecastError::InsufficientData {
                required,
                available,
                ..
            } => {
                assert_eq!(required, 10);
                assert_eq!(available, 9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_points_respect_bounds() {
        let series = aggregate(&records(60));
        let features = build_features(&series).unwrap();
        let data = TrainingData {
            series: &series,
            features: &features,
        };
        let trained = GradientBoostingModel::new(small_config()).train(&data).unwrap();

        let points = trained.forecast(14).unwrap();
        assert_eq!(points.len(), 14);
        for point in &points {
            assert!(point.predicted_sales >= 0.0);
            assert!(point.predicted_bookings >= 1);
            assert_relative_eq!(point.confidence_lower, point.predicted_sales * 0.8);
            assert_relative_eq!(point.confidence_upper, point.predicted_sales * 1.2);
            assert_relative_eq!(point.accuracy_score, 0.92);
        }
    }
}
