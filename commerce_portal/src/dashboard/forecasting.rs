//! Revenue forecast panel

use crate::store::Store;
use crate::{PortalError, Result};
use revenue_forecast::{ForecastSettings, RevenueAnalysis, RevenueReport, RevenueSeries};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPanel {
    /// Observed days in the full history
    pub observed_days: usize,
    pub report: RevenueReport,
}

pub fn build(store: &Store, settings: &ForecastSettings) -> Result<ForecastPanel> {
    let daily = store.daily_revenue()?;
    if daily.is_empty() {
        return Err(PortalError::EmptyResult(
            "No delivered revenue recorded yet.".to_string(),
        ));
    }

    let series = RevenueSeries::from_pairs(daily)?;
    let report = RevenueAnalysis::new(settings.clone())?.run(&series)?;
    info!(
        days = series.len(),
        anomalies = report.metrics.anomaly_count,
        changepoints = report.changepoints.len(),
        "revenue forecast reconciled"
    );

    Ok(ForecastPanel {
        observed_days: series.len(),
        report,
    })
}
