//! Seasonal ARIMA model for daily sales

use crate::config::ArimaConfig;
use crate::error::{ForecastError, Result};
use crate::features::forecast_dates;
use crate::models::{ForecastModel, ForecastPoint, TrainedForecastModel, TrainingData};
use chrono::NaiveDate;
use forecast_math::differencing::{apply_polynomial, difference_polynomial, poly_mul};
use forecast_math::optimization::{nelder_mead, NelderMeadConfig};
use forecast_math::statistics::sample_std_dev;
use tracing::debug;

const COEFFICIENT_BOUND: f64 = 0.99;
const INITIAL_COEFFICIENT: f64 = 0.1;

/// SARIMA(p,d,q)(P,D,Q)s model
#[derive(Debug, Clone)]
pub struct SarimaModel {
    /// Name of the model
    name: String,
    config: ArimaConfig,
}

/// Trained SARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarimaModel {
    /// Name of the model
    name: String,
    config: ArimaConfig,
    /// `phi(B) * Phi(B^s)`, leading 1
    ar_polynomial: Vec<f64>,
    /// `theta(B) * Theta(B^s)`, leading 1
    ma_polynomial: Vec<f64>,
    /// `(1 - B)^d * (1 - B^s)^D`
    difference_polynomial: Vec<f64>,
    /// Observed daily sales
    history: Vec<f64>,
    /// Differenced sales
    differenced: Vec<f64>,
    /// In-sample one-step errors on the differenced scale
    residuals: Vec<f64>,
    residual_std: f64,
    last_date: NaiveDate,
}

impl SarimaModel {
    /// Create a new SARIMA model
    pub fn new(config: ArimaConfig) -> Self {
        let (p, d, q) = config.order;
        let (sp, sd, sq, s) = config.seasonal_order;
        Self {
            name: format!("SARIMA({},{},{})({},{},{}){}", p, d, q, sp, sd, sq, s),
            config,
        }
    }

    pub fn config(&self) -> &ArimaConfig {
        &self.config
    }

    /// Split a flat parameter vector into AR and MA lag polynomials
    fn polynomials(&self, params: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let (p, _, q) = self.config.order;
        let (sp, _, sq, s) = self.config.seasonal_order;

        let (ar, rest) = params.split_at(p);
        let (ma, rest) = rest.split_at(q);
        let (seasonal_ar, seasonal_ma) = rest.split_at(sp);
        let seasonal_ma = &seasonal_ma[..sq];

        let ar_poly = poly_mul(
            &lag_polynomial(ar, 1, -1.0),
            &lag_polynomial(seasonal_ar, s, -1.0),
        );
        let ma_poly = poly_mul(
            &lag_polynomial(ma, 1, 1.0),
            &lag_polynomial(seasonal_ma, s, 1.0),
        );
        (ar_poly, ma_poly)
    }

    fn parameter_count(&self) -> usize {
        let (p, _, q) = self.config.order;
        let (sp, _, sq, _) = self.config.seasonal_order;
        p + q + sp + sq
    }
}

/// `1 + sign * sum(c_i * B^(i * step))`
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// One-step errors of an ARMA model with zero presample values
fn css_residuals(series: &[f64], ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let mut residuals: Vec<f64> = Vec::with_capacity(series.len());
    for t in 0..series.len() {
        let mut e = series[t];
        for (k, a) in ar_poly.iter().enumerate().skip(1).take(t) {
            e += a * series[t - k];
        }
        for (k, m) in ma_poly.iter().enumerate().skip(1).take(t) {
            e -= m * residuals[t - k];
        }
        residuals.push(e);
    }
    residuals
}

impl ForecastModel for SarimaModel {
    type Trained = TrainedSarimaModel;

    fn train(&self, data: &TrainingData<'_>) -> Result<TrainedSarimaModel> {
        let series = data.series;
        if series.len() < self.config.min_observations {
            return Err(ForecastError::InsufficientData {
                model: self.name.clone(),
                required: self.config.min_observations,
                available: series.len(),
            });
        }
        let last_date = series.last_date().ok_or_else(|| {
            ForecastError::Precondition("Daily series has no last date".to_string())
        })?;

        let (_, d, _) = self.config.order;
        let (_, sd, _, s) = self.config.seasonal_order;
        let diff_poly = difference_polynomial(d, sd, s)?;
        let history = series.sales();
        let differenced = apply_polynomial(&history, &diff_poly);
        if differenced.len() < 2 {
            return Err(ForecastError::ModelFit(format!(
                "{} observations leave {} after differencing",
                history.len(),
                differenced.len()
            )));
        }

        let energy: f64 = differenced.iter().map(|w| w * w).sum();
        let n_params = self.parameter_count();
        let params = if n_params == 0 || energy == 0.0 {
            vec![0.0; n_params]
        } else {
            let objective = |params: &[f64]| -> f64 {
                let (ar_poly, ma_poly) = self.polynomials(params);
                let sse: f64 = css_residuals(&differenced, &ar_poly, &ma_poly)
                    .iter()
                    .map(|e| e * e)
                    .sum();
                let value = sse / energy;
                if value.is_finite() {
                    value
                } else {
                    f64::INFINITY
                }
            };
            let bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); n_params];
            let optimizer = NelderMeadConfig {
                max_iter: self.config.max_iterations,
                tolerance: self.config.tolerance,
                ..NelderMeadConfig::default()
            };
            let result = nelder_mead(
                objective,
                &vec![INITIAL_COEFFICIENT; n_params],
                Some(bounds.as_slice()),
                &optimizer,
            )?;

            if !result.optimal_value.is_finite() {
                return Err(ForecastError::ModelFit(
                    "Sum of squares is not finite".to_string(),
                ));
            }
            if !result.converged {
                return Err(ForecastError::ModelFit(format!(
                    "Optimiser did not converge in {} iterations",
                    result.iterations
                )));
            }
            debug!(
                model = %self.name,
                iterations = result.iterations,
                objective = result.optimal_value,
                "estimated coefficients"
            );
            result.optimal_point
        };

        let (ar_polynomial, ma_polynomial) = self.polynomials(&params);
        let residuals = css_residuals(&differenced, &ar_polynomial, &ma_polynomial);
        let residual_std = sample_std_dev(&residuals)
            .map_err(|e| ForecastError::ModelFit(format!("Residual deviation: {}", e)))?;

        Ok(TrainedSarimaModel {
            name: self.name.clone(),
            config: self.config.clone(),
            ar_polynomial,
            ma_polynomial,
            difference_polynomial: diff_poly,
            history,
            differenced,
            residuals,
            residual_std,
            last_date,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaModel {
    /// Standard deviation of the in-sample residuals
    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    /// Point forecasts on the original scale, unclamped
    pub fn forecast_values(&self, horizon: usize) -> Vec<f64> {
        let mut differenced = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        let mut levels = self.history.clone();

        for _ in 0..horizon {
            let t = differenced.len();
            let mut w = 0.0;
            for (k, a) in self.ar_polynomial.iter().enumerate().skip(1).take(t) {
                w -= a * differenced[t - k];
            }
            for (k, m) in self.ma_polynomial.iter().enumerate().skip(1).take(t) {
                w += m * shocks[t - k];
            }
            differenced.push(w);
            shocks.push(0.0);

            let n = levels.len();
            let mut y = w;
            for (k, c) in self.difference_polynomial.iter().enumerate().skip(1).take(n) {
                y -= c * levels[n - k];
            }
            levels.push(y);
        }

        levels.split_off(self.history.len())
    }
}

impl TrainedForecastModel for TrainedSarimaModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<ForecastPoint>> {
        let margin = self.config.z_score * self.residual_std;
        let values = self.forecast_values(horizon);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "Forecast is not finite".to_string(),
            ));
        }

        let points = forecast_dates(self.last_date, horizon)
            .into_iter()
            .zip(values)
            .map(|(date, raw)| {
                let predicted_sales = raw.max(0.0);
                let bookings = (predicted_sales / self.config.average_booking_value).floor();
                ForecastPoint {
                    date,
                    predicted_sales,
                    predicted_bookings: (bookings as u64).max(1),
                    confidence_lower: (raw - margin).max(0.0),
                    confidence_upper: (raw + margin).max(0.0),
                    accuracy_score: self.config.accuracy_score,
                }
            })
            .collect();
        Ok(points)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
