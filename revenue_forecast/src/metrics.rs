//! Headline revenue metrics and chart ranges

use crate::data::RevenueSeries;
use crate::reconcile::Reconciliation;
use crate::smoothing::SmoothedSeries;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Headroom above the highest plotted value
const Y_HEADROOM: f64 = 1.25;

/// Metrics shown under the revenue chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevenueMetrics {
    /// Revenue over the last seven observed days
    pub current_7d_revenue: f64,
    /// Percentage change from the last trend value to the end of the forecast
    pub forecast_trend_pct: Option<f64>,
    /// Number of detected shocks
    pub anomaly_count: usize,
}

impl RevenueMetrics {
    pub fn compute(series: &RevenueSeries, reconciliation: &Reconciliation, anomaly_count: usize) -> Self {
        Self {
            current_7d_revenue: series.tail_sum(7),
            forecast_trend_pct: forecast_trend_pct(reconciliation),
            anomaly_count,
        }
    }
}

/// `(last adjusted prediction / last trend - 1) * 100`
///
/// Undefined without future predictions or with a zero trend.
pub fn forecast_trend_pct(reconciliation: &Reconciliation) -> Option<f64> {
    let last = reconciliation.future().last()?;
    let base = reconciliation.last_trend();
    if base == 0.0 {
        return None;
    }
    Some((last.yhat / base - 1.0) * 100.0)
}

/// Axis ranges for the revenue chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRange {
    pub x_start: NaiveDate,
    pub x_end: NaiveDate,
    pub y_min: f64,
    pub y_max: f64,
}

impl DisplayRange {
    /// Range covering `lookback_days` of history and the displayable forecast
    pub fn compute(smoothed: &SmoothedSeries, reconciliation: &Reconciliation, lookback_days: i64) -> Self {
        let relevant_max = smoothed
            .max_trend()
            .unwrap_or(0.0)
            .max(reconciliation.max_upper().unwrap_or(0.0));

        Self {
            x_start: reconciliation.last_observed() - Duration::days(lookback_days),
            x_end: reconciliation.display_end(),
            y_min: 0.0,
            y_max: relevant_max * Y_HEADROOM,
        }
    }
}
