use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use revenue_forecast::models::{FlatTrendModel, ForecastModel, TrainedForecastModel};
use revenue_forecast::{ForecastError, RevenueSeries};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
}

fn step_series() -> RevenueSeries {
    let values: Vec<f64> = (0..90).map(|i| if i < 60 { 100.0 } else { 200.0 }).collect();
    RevenueSeries::from_daily_values(start(), &values).unwrap()
}

#[test]
fn test_changepoint_lands_near_level_shift() {
    let trained = FlatTrendModel::new().train(&step_series()).unwrap();

    let dominant = trained.dominant_changepoint().unwrap();
    let shift_day = start() + Duration::days(60);
    assert!((dominant.date - shift_day).num_days().abs() <= 5);
    assert!(dominant.delta > 0.0);
    assert!(dominant.significant);
    assert!(trained
        .significant_changepoints()
        .iter()
        .any(|c| c.date == dominant.date));
}

#[test]
fn test_flat_forecast_holds_final_level() {
    let trained = FlatTrendModel::new().train(&step_series()).unwrap();
    assert_relative_eq!(trained.final_level(), 200.0, max_relative = 0.05);

    let frame = trained.forecast(30).unwrap();
    assert_eq!(frame.len(), 120);
    for point in &frame.points()[90..] {
        assert!(point.yhat > 180.0 && point.yhat < 220.0);
    }
}

#[test]
fn test_forecast_covers_history_and_horizon() {
    let trained = FlatTrendModel::new().train(&step_series()).unwrap();
    let frame = trained.forecast(30).unwrap();

    let last_observed = start() + Duration::days(89);
    let (history, future) = frame.partition(last_observed);
    assert_eq!(history.len(), 90);
    assert_eq!(future.len(), 30);
    assert_eq!(future[0].date, last_observed + Duration::days(1));
    assert_eq!(future[29].date, last_observed + Duration::days(30));
}

#[test]
fn test_interval_brackets_prediction() {
    let mut rng = StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 15.0).unwrap();
    let values: Vec<f64> = (0..90)
        .map(|i| {
            let weekly = if i % 7 >= 5 { 40.0 } else { 0.0 };
            (300.0_f64 + weekly + noise.sample(&mut rng)).max(0.0)
        })
        .collect();
    let series = RevenueSeries::from_daily_values(start(), &values).unwrap();

    let trained = FlatTrendModel::new().train(&series).unwrap();
    assert!(trained.noise() > 0.0);

    let frame = trained.forecast(30).unwrap();
    for point in frame.points() {
        assert!(point.yhat_lower < point.yhat);
        assert!(point.yhat < point.yhat_upper);
    }
}

#[test]
fn test_weekly_pattern_is_learned() {
    let values: Vec<f64> = (0..84)
        .map(|i| if i % 7 == 0 { 500.0 } else { 100.0 })
        .collect();
    let series = RevenueSeries::from_daily_values(start(), &values).unwrap();
    let trained = FlatTrendModel::new().train(&series).unwrap();

    let peak = start() + Duration::days(84);
    let quiet = start() + Duration::days(85);
    let predictions = trained.predict(&[peak, quiet]).unwrap();
    assert!(predictions[0].yhat > predictions[1].yhat + 100.0);
}

#[test]
fn test_insufficient_dates() {
    let series = RevenueSeries::from_daily_values(start(), &[42.0]).unwrap();
    let err = FlatTrendModel::new().train(&series).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)));

    let err = FlatTrendModel::new()
        .train(&RevenueSeries::default())
        .unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_two_days_are_enough() {
    let series = RevenueSeries::from_daily_values(start(), &[10.0, 20.0]).unwrap();
    let trained = FlatTrendModel::new().train(&series).unwrap();
    assert!(trained.changepoints().is_empty());
    assert_eq!(trained.forecast(5).unwrap().len(), 7);
}
