//! Forecasting models for daily sales and bookings

use crate::error::{ForecastError, Result};
use crate::features::{DailySeries, FeatureTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{info, warn};

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Never negative
    pub predicted_sales: f64,
    /// At least one
    pub predicted_bookings: u64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
    /// Fixed label of the model that produced the point
    pub accuracy_score: f64,
}

/// Why a model produced no forecast
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailability {
    /// The invocation did not ask for this model
    NotRequested,
    /// Too little history to train
    InsufficientData { required: usize, available: usize },
    /// Training or forecasting failed numerically
    FitFailed(String),
}

/// Result of running one model for one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Unavailable(Unavailability),
    Forecast(Vec<ForecastPoint>),
}

impl ModelOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, ModelOutcome::Forecast(_))
    }
}

/// Everything a model may learn from
#[derive(Debug, Clone, Copy)]
pub struct TrainingData<'a> {
    pub series: &'a DailySeries,
    pub features: &'a FeatureTable,
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Forecast the `horizon` days following the training data
    fn forecast(&self, horizon: usize) -> Result<Vec<ForecastPoint>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily history
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model
    fn train(&self, data: &TrainingData<'_>) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Train `model` and forecast `horizon` days.
///
/// Insufficient history and numerical fit failures become
/// [`ModelOutcome::Unavailable`]; every other error is returned.
pub fn run_model<M: ForecastModel>(
    model: &M,
    data: &TrainingData<'_>,
    horizon: usize,
) -> Result<ModelOutcome> {
    let result = model
        .train(data)
        .and_then(|trained| trained.forecast(horizon));

    match result {
        Ok(points) => {
            info!(model = model.name(), days = points.len(), "forecast ready");
            Ok(ModelOutcome::Forecast(points))
        }
        Err(err) if err.is_model_unavailable() => {
            warn!(model = model.name(), error = %err, "model unavailable");
            Ok(ModelOutcome::Unavailable(unavailability(err)))
        }
        Err(err) => Err(err),
    }
}

fn unavailability(err: ForecastError) -> Unavailability {
    match err {
        ForecastError::InsufficientData {
            required,
            available,
            ..
        } => Unavailability::InsufficientData {
            required,
            available,
        },
        other => Unavailability::FitFailed(other.to_string()),
    }
}

pub mod gradient_boosting;
pub mod sarima;
pub mod tree;
