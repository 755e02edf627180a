//! Lag-polynomial helpers for (seasonal) differencing
//!
//! Polynomials in the backshift operator `B` are stored as coefficient
//! vectors, lowest power first: `[1.0, -1.0]` is `1 - B`.

use crate::{MathError, Result};

/// Multiply two lag polynomials
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// Build `(1 - B)^d * (1 - B^period)^seasonal_d`
pub fn difference_polynomial(d: usize, seasonal_d: usize, period: usize) -> Result<Vec<f64>> {
    if seasonal_d > 0 && period < 2 {
        return Err(MathError::InvalidInput(format!(
            "Seasonal period must be at least 2, got {}",
            period
        )));
    }

    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }

    let mut seasonal = vec![0.0; period + 1];
    if period > 0 {
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
    }
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &seasonal);
    }

    Ok(poly)
}

/// Apply a lag polynomial to a series.
///
/// The output starts at the first position with a full history, so it is
/// `poly.len() - 1` values shorter than the input.
pub fn apply_polynomial(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let order = poly.len().saturating_sub(1);
    if series.len() <= order {
        return Vec::new();
    }

    (order..series.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(k, &c)| c * series[t - k])
                .sum()
        })
        .collect()
}
