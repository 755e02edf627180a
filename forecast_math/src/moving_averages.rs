//! Trailing-window and lag calculations
//!
//! Contains the helpers used to derive history features from a daily series:
//! - Simple Moving Average (SMA), streaming form
//! - Trailing rolling mean over a whole series
//! - Fixed-offset lag
//! - Backward-then-forward gap filling

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) implementation
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Update the SMA with a new value
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Get the current SMA value
    pub fn value(&self) -> Result<f64> {
        if !self.is_ready() {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Whether a full window has been seen
    pub fn is_ready(&self) -> bool {
        self.values.len() == self.period
    }
}

/// Trailing mean over `window` values ending at (and including) each position.
///
/// Positions without a full window are `None`; future values are never used.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut sma = SimpleMovingAverage::new(window)?;

    Ok(values
        .iter()
        .map(|&value| {
            sma.update(value);
            sma.value().ok()
        })
        .collect())
}

/// Value observed `offset` positions earlier, `None` where no such position exists.
pub fn lag(values: &[f64], offset: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(offset).map(|j| values[j]))
        .collect()
}

/// Fill gaps by propagating the next known value backward, then the previous
/// known value forward.
///
/// Entries stay `None` only when the input holds no value at all.
pub fn fill_backward_forward(values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let mut filled = values;

    let mut next = None;
    for slot in filled.iter_mut().rev() {
        match slot {
            Some(value) => next = Some(*value),
            None => *slot = next,
        }
    }

    let mut previous = None;
    for slot in filled.iter_mut() {
        match slot {
            Some(value) => previous = Some(*value),
            None => *slot = previous,
        }
    }

    filled
}
