use chrono::{Duration, NaiveDate};
use revenue_forecast::models::ForecastPoint;
use revenue_forecast::{AnomalyDetector, RevenueSeries};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 4, 1).unwrap()
}

fn flat_predictions(days: i64, value: f64) -> Vec<ForecastPoint> {
    (0..days)
        .map(|d| ForecastPoint::exact(start() + Duration::days(d), value))
        .collect()
}

#[test]
fn test_spike_against_flat_prediction() {
    let mut values = vec![101.0; 30];
    values[12] = 200.0;
    let series = RevenueSeries::from_daily_values(start(), &values).unwrap();

    let anomalies = AnomalyDetector::default().detect(&series, &flat_predictions(30, 100.0));

    assert_eq!(anomalies.len(), 1);
    let shock = anomalies[0];
    assert_eq!(shock.date, start() + Duration::days(12));
    assert_eq!(shock.observed, 200.0);
    assert_eq!(shock.residual, 100.0);
    assert!(shock.score > 3.0);
}

#[test]
fn test_dates_without_prediction_are_ignored() {
    let mut values = vec![100.0; 40];
    // Spike outside the predicted range
    values[2] = 10_000.0;
    let series = RevenueSeries::from_daily_values(start(), &values).unwrap();

    // Predictions only exist for days 10..40
    let predictions: Vec<ForecastPoint> = flat_predictions(40, 100.0).split_off(10);
    let anomalies = AnomalyDetector::default().detect(&series, &predictions);
    assert!(anomalies.is_empty());
}

#[test]
fn test_single_joined_residual_flags_nothing() {
    let series = RevenueSeries::from_daily_values(start(), &[5_000.0, 1.0]).unwrap();
    let predictions = vec![ForecastPoint::exact(start(), 0.0)];
    assert!(AnomalyDetector::default().detect(&series, &predictions).is_empty());
}

#[test]
fn test_no_predictions_flags_nothing() {
    let series = RevenueSeries::from_daily_values(start(), &[1.0, 2.0, 3.0]).unwrap();
    assert!(AnomalyDetector::default().detect(&series, &[]).is_empty());
}

#[test]
fn test_residual_scenario() {
    let detector = AnomalyDetector::default();

    let mut residuals = vec![1.0; 24];
    residuals.push(100.0);
    let flagged = detector.flag_residuals(&residuals);
    assert_eq!(flagged, vec![24]);
}
