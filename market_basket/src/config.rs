//! Mining thresholds

use crate::error::{BasketError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds for frequent itemsets and association rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AprioriConfig {
    /// Smallest share of transactions an itemset must appear in
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    /// Rules kept after sorting by lift
    pub max_rules: usize,
    /// Fewer transactions than this yield no rules
    pub min_transactions: usize,
}

impl Default for AprioriConfig {
    fn default() -> Self {
        Self {
            min_support: 0.01,
            min_confidence: 0.3,
            min_lift: 1.0,
            max_rules: 20,
            min_transactions: 3,
        }
    }
}

impl AprioriConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(BasketError::InvalidParameter(format!(
                "min_support must be in (0, 1], got {}",
                self.min_support
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(BasketError::InvalidParameter(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !(self.min_lift >= 0.0) {
            return Err(BasketError::InvalidParameter(format!(
                "min_lift must not be negative, got {}",
                self.min_lift
            )));
        }
        if self.max_rules == 0 {
            return Err(BasketError::InvalidParameter(
                "max_rules must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
