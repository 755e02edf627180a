use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::data::{generate_synthetic_data, TransactionRecord};
use sales_forecast::features::{aggregate, build_features, FEATURE_NAMES};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Records on every third day with two bookings on some days
fn sparse_records() -> Vec<TransactionRecord> {
    let start = date(2024, 1, 1);
    (0..40)
        .flat_map(|i| {
            let day = start + Duration::days(i * 3);
            let mut records = vec![TransactionRecord::new(day, 1000.0 + i as f64, 2)];
            if i % 4 == 0 {
                records.push(TransactionRecord::new(day, 250.0, 1));
            }
            records
        })
        .collect()
}

#[test]
fn test_daily_series_has_no_gaps() {
    let series = aggregate(&sparse_records());

    assert_eq!(series.len(), 118);
    for pair in series.points().windows(2) {
        assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
    }
    assert!(series.points().iter().all(|p| p.total_amount >= 0.0));
}

#[test]
fn test_totals_are_preserved() {
    let records = sparse_records();
    let series = aggregate(&records);

    let expected: f64 = records.iter().map(|r| r.total_amount).sum();
    let found: f64 = series.sales().iter().sum();
    assert_relative_eq!(found, expected, epsilon = 1e-6);
    assert_eq!(series.points()[0].travelers, 3);
}

#[rstest]
#[case(1)]
#[case(6)]
#[case(13)]
#[case(29)]
#[case(30)]
#[case(120)]
fn test_no_undefined_feature_fields(#[case] days: usize) {
    let records = generate_synthetic_data(date(2024, 12, 31), days, 7);
    let table = build_features(&aggregate(&records)).unwrap();

    assert_eq!(table.len(), days);
    for row in table.rows() {
        let values = row.to_row();
        assert_eq!(values.len(), FEATURE_NAMES.len());
        assert!(values.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_lags_and_trailing_means() {
    let start = date(2024, 1, 1);
    let records: Vec<_> = (0..40)
        .map(|i| TransactionRecord::new(start + Duration::days(i), i as f64, 1))
        .collect();
    let table = build_features(&aggregate(&records)).unwrap();
    let rows = table.rows();

    assert_eq!(rows[20].sales_lag_7, 13.0);
    assert_eq!(rows[20].sales_lag_14, 6.0);
    // mean of 14..=20
    assert_relative_eq!(rows[20].sales_rolling_7, 17.0);
    // mean of 10..=39
    assert_relative_eq!(rows[39].sales_rolling_30, 24.5);
    // filled backward from the first observed lag
    assert_eq!(rows[0].sales_lag_7, 0.0);
    assert_eq!(rows[0].sales_lag_14, 0.0);
    assert_relative_eq!(rows[0].sales_rolling_30, 14.5);

    assert_eq!(table.complete_history_rows(), 11);
    assert_eq!(table.last().unwrap().date, date(2024, 2, 9));
}

#[test]
fn test_empty_input() {
    let series = aggregate(&[]);
    assert!(series.is_empty());
    assert!(build_features(&series).unwrap().is_empty());
}
