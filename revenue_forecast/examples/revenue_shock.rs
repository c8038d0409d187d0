use chrono::NaiveDate;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use revenue_forecast::models::{FlatTrendModel, ForecastModel, TrainedForecastModel};
use revenue_forecast::{RevenueAnalysis, RevenueSeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Revenue Forecast: Level Shift Example");
    println!("=====================================\n");

    let series = create_sample_revenue()?;
    println!(
        "Sample data created: {} days from {:?} to {:?}\n",
        series.len(),
        series.first_date(),
        series.last_date()
    );

    // Fit the model on its own to inspect the changepoints it found
    let trained = FlatTrendModel::new().train(&series.trailing_window(90))?;
    if let Some(cp) = trained.dominant_changepoint() {
        println!("Dominant changepoint: {} (shift {:+.3})", cp.date, cp.delta);
    }
    println!(
        "{} of {} candidate changepoints are significant\n",
        trained.significant_changepoints().len(),
        trained.changepoints().len()
    );

    // Full pipeline: smoothing, reconciliation, shocks and metrics
    let report = RevenueAnalysis::default().run(&series)?;
    println!("Current 7d revenue: {:.2}", report.metrics.current_7d_revenue);
    match report.metrics.forecast_trend_pct {
        Some(pct) => println!("Forecast trend:     {pct:+.1}%"),
        None => println!("Forecast trend:     N/A"),
    }
    println!("Shocks detected:    {}", report.metrics.anomaly_count);

    println!("\nReconciled forecast (every 5th day):");
    for point in report.reconciliation.display().iter().step_by(5) {
        println!(
            "  {}: {:.2} ({:.2}, {:.2})",
            point.date, point.yhat, point.yhat_lower, point.yhat_upper
        );
    }

    Ok(())
}

/// Daily revenue around 1000 that doubles after day 100, with one spike
fn create_sample_revenue() -> Result<RevenueSeries, Box<dyn std::error::Error>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let noise = Normal::new(0.0, 40.0)?;
    let start = NaiveDate::from_ymd_opt(2018, 1, 1).ok_or("invalid start date")?;

    let values: Vec<f64> = (0..150)
        .map(|day| {
            let level = if day < 100 { 1000.0 } else { 2000.0 };
            let spike = if day == 130 { 1500.0 } else { 0.0 };
            (level as f64 + spike + noise.sample(&mut rng)).max(0.0)
        })
        .collect();

    Ok(RevenueSeries::from_daily_values(start, &values)?)
}
