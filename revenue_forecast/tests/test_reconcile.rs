use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use revenue_forecast::models::{FlatTrendModel, ForecastModel, TrainedForecastModel};
use revenue_forecast::{Reconciler, RevenueSeries, TrendSmoother};
use rstest::rstest;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2017, 11, 1).unwrap()
}

fn random_series(seed: u64, len: usize) -> RevenueSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..len)
        .map(|_| {
            // Occasional zero days and large spikes
            match rng.gen_range(0..10) {
                0 => 0.0,
                1 => rng.gen_range(5_000.0..20_000.0),
                _ => rng.gen_range(0.0..1_000.0),
            }
        })
        .collect();
    RevenueSeries::from_daily_values(start(), &values).unwrap()
}

#[rstest]
#[case(1, 2)]
#[case(2, 15)]
#[case(3, 45)]
#[case(4, 91)]
#[case(5, 120)]
#[case(6, 200)]
fn test_reconciled_forecast_invariants(#[case] seed: u64, #[case] len: usize) {
    let series = random_series(seed, len);
    let smoothed = TrendSmoother::default().smooth(&series).unwrap();
    let trained = FlatTrendModel::new()
        .train(&series.trailing_window(90))
        .unwrap();
    let frame = trained.forecast(30).unwrap();

    let rec = Reconciler::reconcile(&smoothed, &frame).unwrap();
    let display = rec.display();

    // Starts exactly at the last trend value
    assert_eq!(display.len(), 31);
    assert_eq!(display[0].date, series.last_date().unwrap());
    assert_eq!(display[0].yhat, smoothed.last_trend().unwrap());
    assert_eq!(display[0].yhat_lower, display[0].yhat);
    assert_eq!(display[0].yhat_upper, display[0].yhat);

    // Ascending dates, never negative
    assert!(display.windows(2).all(|w| w[0].date < w[1].date));
    for point in display {
        assert!(point.yhat >= 0.0);
        assert!(point.yhat_lower >= 0.0);
        assert!(point.yhat_upper >= 0.0);
    }
}

#[test]
fn test_zero_horizon_has_no_display_series() {
    let series = random_series(11, 30);
    let smoothed = TrendSmoother::default().smooth(&series).unwrap();
    let trained = FlatTrendModel::new().train(&series).unwrap();
    let frame = trained.forecast(0).unwrap();

    let rec = Reconciler::reconcile(&smoothed, &frame).unwrap();
    assert!(rec.display().is_empty());
    assert!(rec.future().is_empty());
    assert_eq!(rec.offset(), None);
    assert_eq!(rec.in_window().len(), 30);
}
