use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::config::EnsembleConfig;
use sales_forecast::ensemble::combine;
use sales_forecast::models::{ForecastPoint, ModelOutcome, Unavailability};
use sales_forecast::ForecastError;

fn points(start_day: u32, sales: &[f64], accuracy: f64) -> Vec<ForecastPoint> {
    let start = NaiveDate::from_ymd_opt(2025, 5, start_day).unwrap();
    sales
        .iter()
        .enumerate()
        .map(|(i, &s)| ForecastPoint {
            date: start + Duration::days(i as i64),
            predicted_sales: s,
            predicted_bookings: (s / 1000.0) as u64 + 1,
            confidence_lower: s * 0.7,
            confidence_upper: s * 1.4,
            accuracy_score: accuracy,
        })
        .collect()
}

#[rstest]
#[case(Unavailability::NotRequested)]
#[case(Unavailability::InsufficientData { required: 10, available: 4 })]
#[case(Unavailability::FitFailed("no convergence".to_string()))]
fn test_single_forecast_passes_through(#[case] reason: Unavailability) {
    let classical = points(1, &[1200.0, 3400.0], 0.85);
    let regression = points(1, &[900.0, 5100.0], 0.92);
    let config = EnsembleConfig::default();

    let only_classical = combine(
        ModelOutcome::Forecast(classical.clone()),
        ModelOutcome::Unavailable(reason.clone()),
        &config,
    )
    .unwrap();
    assert_eq!(only_classical, classical);

    let only_regression = combine(
        ModelOutcome::Unavailable(reason),
        ModelOutcome::Forecast(regression.clone()),
        &config,
    )
    .unwrap();
    assert_eq!(only_regression, regression);
}

#[test]
fn test_merged_bounds_cover_both_models() {
    let classical = points(1, &[1200.0, 3400.0, 0.0], 0.85);
    let regression = points(1, &[900.0, 5100.0, 2500.0], 0.92);

    let merged = combine(
        ModelOutcome::Forecast(classical.clone()),
        ModelOutcome::Forecast(regression.clone()),
        &EnsembleConfig::default(),
    )
    .unwrap();

    assert_eq!(merged.len(), 3);
    for ((m, a), b) in merged.iter().zip(&classical).zip(&regression) {
        assert_eq!(m.date, a.date);
        assert!(m.confidence_lower <= a.confidence_lower.min(b.confidence_lower));
        assert!(m.confidence_upper >= a.confidence_upper.max(b.confidence_upper));
        assert!(m.predicted_sales >= 0.0);
        assert_eq!(
            m.predicted_bookings,
            (a.predicted_bookings + b.predicted_bookings) / 2
        );
        assert_eq!(m.accuracy_score, 0.94);
    }
    assert_eq!(merged[1].predicted_sales, 4250.0);
}

#[test]
fn test_length_mismatch_is_precondition_violation() {
    let err = combine(
        ModelOutcome::Forecast(points(1, &[1.0, 2.0], 0.85)),
        ModelOutcome::Forecast(points(1, &[1.0], 0.92)),
        &EnsembleConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Precondition(_)));
}

#[test]
fn test_date_mismatch_is_precondition_violation() {
    let err = combine(
        ModelOutcome::Forecast(points(1, &[1.0, 2.0], 0.85)),
        ModelOutcome::Forecast(points(2, &[1.0, 2.0], 0.92)),
        &EnsembleConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Precondition(_)));
    assert!(!err.is_model_unavailable());
}
