//! Invocation and model configuration
//!
//! Every tunable value is carried by [`ForecastConfig`] and handed to the
//! pipeline and model constructors explicitly.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the SQLite transaction database
pub const DATABASE_PATH_ENV: &str = "TOURISM_DB_PATH";

/// Which forecasting branch(es) to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Seasonal ARIMA only
    Classical,
    /// Gradient-boosted trees only
    Regression,
    /// Both, merged by the ensemble combiner
    Ensemble,
}

impl ModelKind {
    /// Whether the seasonal ARIMA branch runs
    pub fn runs_classical(self) -> bool {
        matches!(self, ModelKind::Classical | ModelKind::Ensemble)
    }

    /// Whether the gradient-boosting branch runs
    pub fn runs_regression(self) -> bool {
        matches!(self, ModelKind::Regression | ModelKind::Ensemble)
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "classical" | "arima" | "sarima" => Ok(ModelKind::Classical),
            "regression" | "xgboost" | "gbr" | "gradient_boosting" => Ok(ModelKind::Regression),
            "ensemble" => Ok(ModelKind::Ensemble),
            other => Err(ForecastError::InvalidParameter(format!(
                "Unknown model '{}', expected classical, regression or ensemble",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Classical => "classical",
            ModelKind::Regression => "regression",
            ModelKind::Ensemble => "ensemble",
        };
        f.write_str(name)
    }
}

/// Destination selector applied to the transaction source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Destination id or destination category name
    Destination(String),
}

impl FromStr for CategoryFilter {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Destination filter must not be empty".to_string(),
            ));
        }
        if value.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Destination(value.to_string()))
        }
    }
}

impl CategoryFilter {
    /// Whether a record tagged with `category` passes the filter
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Destination(wanted) => {
                category.map_or(false, |c| c.eq_ignore_ascii_case(wanted))
            }
        }
    }
}

/// Seasonal ARIMA settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaConfig {
    /// Non-seasonal (p, d, q)
    pub order: (usize, usize, usize),
    /// Seasonal (P, D, Q, s)
    pub seasonal_order: (usize, usize, usize, usize),
    /// Fewest gap-filled daily points the model accepts
    pub min_observations: usize,
    /// Normal quantile for the residual interval
    pub z_score: f64,
    /// Revenue per booking used to derive booking counts
    pub average_booking_value: f64,
    /// Fixed accuracy label attached to every point
    pub accuracy_score: f64,
    /// Optimiser iteration cap
    pub max_iterations: usize,
    /// Optimiser convergence tolerance
    pub tolerance: f64,
}

impl Default for ArimaConfig {
    fn default() -> Self {
        Self {
            order: (1, 1, 1),
            seasonal_order: (1, 1, 1, 7),
            min_observations: 10,
            z_score: 1.96,
            average_booking_value: 5000.0,
            accuracy_score: 0.85,
            max_iterations: 2000,
            tolerance: 1e-8,
        }
    }
}

/// Gradient-boosted tree settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Fewest rows with complete lag/rolling history the model accepts
    pub min_complete_rows: usize,
    /// Half-width of the heuristic interval as a fraction of the point forecast
    pub interval_fraction: f64,
    /// Fixed accuracy label attached to every point
    pub accuracy_score: f64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 5,
            learning_rate: 0.1,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
            min_complete_rows: 10,
            interval_fraction: 0.20,
            accuracy_score: 0.92,
        }
    }
}

/// Ensemble combiner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Accuracy label for merged points, distinct from either model's label
    pub accuracy_score: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            accuracy_score: 0.94,
        }
    }
}

/// All model hyperparameters, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub arima: ArimaConfig,
    pub boosting: BoostingConfig,
    pub ensemble: EnsembleConfig,
}

impl ModelParameters {
    /// Read parameters from a JSON file; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let params: ModelParameters = serde_json::from_str(&text)?;
        params.validate()?;
        Ok(params)
    }

    /// Reject values the models cannot work with
    pub fn validate(&self) -> Result<()> {
        let arima = &self.arima;
        if arima.seasonal_order.1 > 0 && arima.seasonal_order.3 < 2 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be at least 2".to_string(),
            ));
        }
        if arima.average_booking_value <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Average booking value must be positive".to_string(),
            ));
        }
        if arima.z_score < 0.0 {
            return Err(ForecastError::InvalidParameter(
                "z-score must not be negative".to_string(),
            ));
        }

        let boosting = &self.boosting;
        if boosting.n_estimators == 0 || boosting.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Boosting needs at least one estimator of depth >= 1".to_string(),
            ));
        }
        if !(boosting.learning_rate > 0.0 && boosting.learning_rate <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }
        if boosting.min_samples_leaf == 0 || boosting.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&boosting.interval_fraction) {
            return Err(ForecastError::InvalidParameter(
                "Interval fraction must be in [0, 1)".to_string(),
            ));
        }

        for score in [
            arima.accuracy_score,
            boosting.accuracy_score,
            self.ensemble.accuracy_score,
        ] {
            if !(0.0..=1.0).contains(&score) {
                return Err(ForecastError::InvalidParameter(format!(
                    "Accuracy score {} outside [0, 1]",
                    score
                )));
            }
        }

        Ok(())
    }
}

/// Parameters of a single forecasting run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub model: ModelKind,
    pub category: CategoryFilter,
    /// Days to forecast
    pub horizon: usize,
    /// Tabular file overriding the database
    pub csv_file: Option<PathBuf>,
    /// SQLite transaction database
    pub database_path: Option<PathBuf>,
    /// Fit both models concurrently in ensemble mode
    pub parallel: bool,
    pub params: ModelParameters,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Regression,
            category: CategoryFilter::All,
            horizon: 30,
            csv_file: None,
            database_path: None,
            parallel: false,
            params: ModelParameters::default(),
        }
    }
}

impl ForecastConfig {
    /// Defaults plus the database location from the environment
    pub fn from_env() -> Self {
        Self {
            database_path: std::env::var_os(DATABASE_PATH_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Check invocation parameters and model parameters
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be a positive number of days".to_string(),
            ));
        }
        self.params.validate()
    }
}
