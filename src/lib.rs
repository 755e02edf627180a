//! # Tourism Insights
//!
//! `tourism_insights` bundles the analytics crates of the tourism booking
//! platform:
//!
//! - [`sales_forecast`]: daily sales and booking forecasts
//! - [`market_basket`]: services that are bought together
//! - [`forecast_math`]: the numerical helpers both build on
//!
//! ## Example
//!
//! ```
//! use tourism_insights::sales_forecast::{ForecastConfig, ForecastPipeline, ModelKind};
//! use tourism_insights::sales_forecast::data::generate_synthetic_data;
//! use chrono::NaiveDate;
//!
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//! let records = generate_synthetic_data(end, 60, 42);
//!
//! let config = ForecastConfig {
//!     model: ModelKind::Classical,
//!     horizon: 3,
//!     ..ForecastConfig::default()
//! };
//! let points = ForecastPipeline::new(config).run_on_records(&records).unwrap();
//! assert!(points.len() <= 3);
//! ```

pub use forecast_math;
pub use market_basket;
pub use sales_forecast;

/// Version of the bundle
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
