//! # Sales Forecast
//!
//! Daily sales and booking forecasts for tourism transaction histories.
//!
//! ## Features
//!
//! - Transaction loading from CSV/Parquet files, a SQLite booking database, or
//!   a seeded synthetic generator
//! - Gap-free daily aggregation and calendar/sales-history features
//! - Seasonal ARIMA with residual-based intervals
//! - Gradient-boosted trees forecasting day by day
//! - An ensemble that merges both forecasts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::{ForecastConfig, ModelKind};
//! use sales_forecast::pipeline::ForecastPipeline;
//!
//! let config = ForecastConfig {
//!     model: ModelKind::Ensemble,
//!     horizon: 7,
//!     ..ForecastConfig::default()
//! };
//!
//! let points = ForecastPipeline::new(config).run()?;
//! for point in &points {
//!     println!("{} {:.2}", point.date, point.predicted_sales);
//! }
//! # Ok::<(), sales_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod models;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use crate::config::{CategoryFilter, ForecastConfig, ModelKind, ModelParameters};
pub use crate::data::{DataLoader, DataSource, TransactionRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastModel, ForecastPoint, ModelOutcome, TrainedForecastModel};
pub use crate::output::{write_forecast, OutputFormat};
pub use crate::pipeline::ForecastPipeline;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
