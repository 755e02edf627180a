//! Daily aggregation and feature engineering
//!
//! Transactions are summed per calendar day into a gap-free [`DailySeries`],
//! which is then expanded into one [`FeatureVector`] per day: calendar fields
//! plus lagged and trailing-mean sales history.

use crate::data::TransactionRecord;
use crate::error::Result;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use forecast_math::moving_averages::{fill_backward_forward, lag, rolling_mean};
use forecast_math::statistics::mean;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Short sales lag in days
pub const LAG_SHORT: usize = 7;
/// Long sales lag in days
pub const LAG_LONG: usize = 14;
/// Short trailing window in days
pub const WINDOW_SHORT: usize = 7;
/// Long trailing window in days
pub const WINDOW_LONG: usize = 30;

/// Column order of [`FeatureVector::to_row`]
pub const FEATURE_NAMES: [&str; 11] = [
    "year",
    "month",
    "day",
    "day_of_week",
    "quarter",
    "day_of_year",
    "is_weekend",
    "sales_lag_7",
    "sales_lag_14",
    "sales_rolling_7",
    "sales_rolling_30",
];

/// Totals of one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub total_amount: f64,
    pub travelers: u64,
}

/// Contiguous daily totals, one point per day, no gaps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    points: Vec<DailyPoint>,
}

impl DailySeries {
    pub fn points(&self) -> &[DailyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Daily sales in date order
    pub fn sales(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_amount).collect()
    }

    /// Daily traveler counts in date order
    pub fn travelers(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.travelers as f64).collect()
    }
}

/// Sum transactions per day and zero-fill every missing day between the first
/// and last booking date.
pub fn aggregate(records: &[TransactionRecord]) -> DailySeries {
    let mut totals: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.booking_date).or_insert((0.0, 0));
        entry.0 += record.total_amount;
        entry.1 += u64::from(record.number_of_travelers);
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return DailySeries::default(),
    };

    let points = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let (total_amount, travelers) = totals.get(&date).copied().unwrap_or((0.0, 0));
            DailyPoint {
                date,
                total_amount,
                travelers,
            }
        })
        .collect();

    DailySeries { points }
}

/// Sales history carried from one forecast step to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagState {
    pub lag_7: f64,
    pub lag_14: f64,
    pub rolling_7: f64,
    pub rolling_30: f64,
}

impl LagState {
    /// Same history with a new short lag
    pub fn with_lag_7(self, value: f64) -> Self {
        Self {
            lag_7: value,
            ..self
        }
    }
}

impl From<&FeatureVector> for LagState {
    fn from(row: &FeatureVector) -> Self {
        Self {
            lag_7: row.sales_lag_7,
            lag_14: row.sales_lag_14,
            rolling_7: row.sales_rolling_7,
            rolling_30: row.sales_rolling_30,
        }
    }
}

/// Model input for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Monday = 0
    pub day_of_week: u32,
    pub quarter: u32,
    pub day_of_year: u32,
    pub is_weekend: bool,
    pub sales_lag_7: f64,
    pub sales_lag_14: f64,
    pub sales_rolling_7: f64,
    pub sales_rolling_30: f64,
}

impl FeatureVector {
    /// Calendar fields of `date` combined with the given history
    pub fn for_date(date: NaiveDate, history: &LagState) -> Self {
        let weekday = date.weekday();
        Self {
            date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            day_of_week: weekday.num_days_from_monday(),
            quarter: (date.month() - 1) / 3 + 1,
            day_of_year: date.ordinal(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            sales_lag_7: history.lag_7,
            sales_lag_14: history.lag_14,
            sales_rolling_7: history.rolling_7,
            sales_rolling_30: history.rolling_30,
        }
    }

    /// Numeric layout in [`FEATURE_NAMES`] order
    pub fn to_row(&self) -> [f64; 11] {
        [
            f64::from(self.year),
            f64::from(self.month),
            f64::from(self.day),
            f64::from(self.day_of_week),
            f64::from(self.quarter),
            f64::from(self.day_of_year),
            if self.is_weekend { 1.0 } else { 0.0 },
            self.sales_lag_7,
            self.sales_lag_14,
            self.sales_rolling_7,
            self.sales_rolling_30,
        ]
    }

    pub fn history(&self) -> LagState {
        LagState::from(self)
    }
}

/// One feature row per day of a [`DailySeries`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row, the seed of iterative forecasting
    pub fn last(&self) -> Option<&FeatureVector> {
        self.rows.last()
    }

    /// Rows whose lags and trailing means were all observed, not filled
    pub fn complete_history_rows(&self) -> usize {
        let longest = LAG_LONG.max(WINDOW_LONG);
        self.rows.len().saturating_sub(longest - 1)
    }

    /// Rows in the numeric layout used for training
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(|r| r.to_row().to_vec()).collect()
    }
}

/// Expand a daily series into feature rows.
///
/// Lags and trailing means missing at the start of the series are filled
/// backward then forward; a history column with no observed value at all takes
/// the series mean.
pub fn build_features(series: &DailySeries) -> Result<FeatureTable> {
    if series.is_empty() {
        return Ok(FeatureTable::default());
    }

    let sales = series.sales();
    let fallback = mean(&sales)?;
    let complete = |column: Vec<Option<f64>>| -> Vec<f64> {
        fill_backward_forward(column)
            .into_iter()
            .map(|v| v.unwrap_or(fallback))
            .collect()
    };

    let lag_7 = complete(lag(&sales, LAG_SHORT));
    let lag_14 = complete(lag(&sales, LAG_LONG));
    let rolling_7 = complete(rolling_mean(&sales, WINDOW_SHORT)?);
    let rolling_30 = complete(rolling_mean(&sales, WINDOW_LONG)?);

    let rows = series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let history = LagState {
                lag_7: lag_7[i],
                lag_14: lag_14[i],
                rolling_7: rolling_7[i],
                rolling_30: rolling_30[i],
            };
            FeatureVector::for_date(point.date, &history)
        })
        .collect();

    Ok(FeatureTable { rows })
}

/// Dates `last + 1 ..= last + horizon`
pub fn forecast_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|offset| last + Duration::days(offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_aggregate_sums_same_day() {
        let records = vec![
            TransactionRecord::new(date(2024, 1, 1), 100.0, 2),
            TransactionRecord::new(date(2024, 1, 1), 50.0, 1),
        ];
        let series = aggregate(&records);

        assert_eq!(series.len(), 1);
        assert_relative_eq!(series.points()[0].total_amount, 150.0);
        assert_eq!(series.points()[0].travelers, 3);
    }

    #[test]
    fn test_aggregate_zero_fills_gaps() {
        let records = vec![
            TransactionRecord::new(date(2024, 1, 4), 40.0, 4),
            TransactionRecord::new(date(2024, 1, 1), 10.0, 1),
        ];
        let series = aggregate(&records);

        assert_eq!(series.len(), 4);
        assert_eq!(series.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(series.last_date(), Some(date(2024, 1, 4)));
        assert_eq!(series.sales(), vec![10.0, 0.0, 0.0, 40.0]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_calendar_fields() {
        let history = LagState {
            lag_7: 1.0,
            lag_14: 2.0,
            rolling_7: 3.0,
            rolling_30: 4.0,
        };
        // 2024-03-31 is a Sunday
        let row = FeatureVector::for_date(date(2024, 3, 31), &history);

        assert_eq!(row.day_of_week, 6);
        assert!(row.is_weekend);
        assert_eq!(row.quarter, 1);
        assert_eq!(row.day_of_year, 91);
        assert_eq!(
            row.to_row(),
            [2024.0, 3.0, 31.0, 6.0, 1.0, 91.0, 1.0, 1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_with_lag_7_only_touches_short_lag() {
        let history = LagState {
            lag_7: 1.0,
            lag_14: 2.0,
            rolling_7: 3.0,
            rolling_30: 4.0,
        };
        let next = history.with_lag_7(9.0);
        assert_eq!(next, LagState { lag_7: 9.0, ..history });
    }

    #[test]
    fn test_short_series_uses_mean_for_unobserved_columns() {
        let records: Vec<_> = (1..=5)
            .map(|d| TransactionRecord::new(date(2024, 1, d), d as f64 * 10.0, 1))
            .collect();
        let table = build_features(&aggregate(&records)).unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(table.complete_history_rows(), 0);
        for row in table.rows() {
            assert_relative_eq!(row.sales_lag_7, 30.0);
            assert_relative_eq!(row.sales_rolling_30, 30.0);
        }
    }

    #[test]
    fn test_forecast_dates_start_after_last() {
        assert_eq!(
            forecast_dates(date(2024, 12, 30), 3),
            vec![date(2024, 12, 31), date(2025, 1, 1), date(2025, 1, 2)]
        );
    }
}
