//! End-to-end forecasting run
//!
//! load -> aggregate -> build features -> run the requested models -> combine

use crate::config::ForecastConfig;
use crate::data::{DataLoader, DataSource, TransactionRecord};
use crate::ensemble::combine;
use crate::error::Result;
use crate::features::{aggregate, build_features};
use crate::models::gradient_boosting::GradientBoostingModel;
use crate::models::sarima::SarimaModel;
use crate::models::{run_model, ForecastPoint, ModelOutcome, TrainingData, Unavailability};
use tracing::info;

/// A configured forecasting run
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
    loader: DataLoader,
}

impl ForecastPipeline {
    /// Pipeline reading from the source named by `config`
    pub fn new(config: ForecastConfig) -> Self {
        let loader = DataLoader::new().with_category(config.category.clone());
        Self { config, loader }
    }

    /// Replace the loader, e.g. to pin the synthetic end date
    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = loader.with_category(self.config.category.clone());
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Load transactions and forecast
    pub fn run(&self) -> Result<Vec<ForecastPoint>> {
        self.config.validate()?;
        let source = DataSource::from_config(&self.config);
        let loaded = self.loader.load(&source)?;
        info!(origin = ?loaded.origin, records = loaded.records.len(), "transactions loaded");
        self.run_on_records(&loaded.records)
    }

    /// Forecast from already loaded transactions
    pub fn run_on_records(&self, records: &[TransactionRecord]) -> Result<Vec<ForecastPoint>> {
        self.config.validate()?;
        if records.is_empty() {
            info!("no transactions, nothing to forecast");
            return Ok(Vec::new());
        }

        let series = aggregate(records);
        let features = build_features(&series)?;
        let data = TrainingData {
            series: &series,
            features: &features,
        };
        info!(
            days = series.len(),
            model = %self.config.model,
            horizon = self.config.horizon,
            "forecasting"
        );

        let (classical, regression) = if self.config.parallel {
            rayon::join(|| self.classical(&data), || self.regression(&data))
        } else {
            (self.classical(&data), self.regression(&data))
        };

        let params = &self.config.params;
        combine(classical?, regression?, &params.ensemble)
    }

    fn classical(&self, data: &TrainingData<'_>) -> Result<ModelOutcome> {
        if !self.config.model.runs_classical() {
            return Ok(ModelOutcome::Unavailable(Unavailability::NotRequested));
        }
        let model = SarimaModel::new(self.config.params.arima.clone());
        run_model(&model, data, self.config.horizon)
    }

    fn regression(&self, data: &TrainingData<'_>) -> Result<ModelOutcome> {
        if !self.config.model.runs_regression() {
            return Ok(ModelOutcome::Unavailable(Unavailability::NotRequested));
        }
        let model = GradientBoostingModel::new(self.config.params.boosting.clone());
        run_model(&model, data, self.config.horizon)
    }
}

/// Run a forecast for `config` with the default loader
pub fn forecast(config: ForecastConfig) -> Result<Vec<ForecastPoint>> {
    ForecastPipeline::new(config).run()
}
