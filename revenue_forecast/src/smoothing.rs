//! Trend smoothing of daily revenue
//!
//! Produces the short-window trend line (shrinking window at the start of
//! the series) and the long-window baseline line (undefined until the window
//! is full) for every observed day.

use crate::data::RevenueSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use commerce_math::trailing_means;
use serde::Serialize;

/// Default trend window in observed days
pub const DEFAULT_TREND_WINDOW: usize = 7;
/// Default baseline window in observed days
pub const DEFAULT_BASELINE_WINDOW: usize = 14;

/// One observed day with its smoothed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub amount: f64,
    /// Trailing short-window mean, always defined
    pub trend: f64,
    /// Trailing long-window mean, `None` until the window is full
    pub baseline: Option<f64>,
}

/// Output of the trend smoother, same length as the input series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SmoothedSeries {
    points: Vec<SmoothedPoint>,
}

impl SmoothedSeries {
    pub fn points(&self) -> &[SmoothedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Trend value at the last observed day
    pub fn last_trend(&self) -> Option<f64> {
        self.points.last().map(|p| p.trend)
    }

    /// Baseline value at the last observed day
    pub fn last_baseline(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.baseline)
    }

    /// Highest trend value in the series
    pub fn max_trend(&self) -> Option<f64> {
        self.points.iter().map(|p| p.trend).reduce(f64::max)
    }
}

/// Computes trailing trend and baseline averages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSmoother {
    trend_window: usize,
    baseline_window: usize,
}

impl Default for TrendSmoother {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            baseline_window: DEFAULT_BASELINE_WINDOW,
        }
    }
}

impl TrendSmoother {
    /// Create a smoother with custom window lengths
    pub fn new(trend_window: usize, baseline_window: usize) -> Result<Self> {
        if trend_window == 0 || baseline_window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Smoothing windows must be positive".to_string(),
            ));
        }
        Ok(Self {
            trend_window,
            baseline_window,
        })
    }

    pub fn trend_window(&self) -> usize {
        self.trend_window
    }

    pub fn baseline_window(&self) -> usize {
        self.baseline_window
    }

    /// Smooth a revenue series
    pub fn smooth(&self, series: &RevenueSeries) -> Result<SmoothedSeries> {
        let amounts = series.amounts();
        let trend = trailing_means(&amounts, self.trend_window, 1)?;
        let baseline = trailing_means(&amounts, self.baseline_window, self.baseline_window)?;

        let points = series
            .points()
            .iter()
            .zip(trend)
            .zip(baseline)
            .map(|((obs, trend), baseline)| SmoothedPoint {
                date: obs.date,
                amount: obs.amount,
                // min_periods of 1 guarantees a value at every position
                trend: trend.unwrap_or(obs.amount),
                baseline,
            })
            .collect();

        Ok(SmoothedSeries { points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 3, 1).unwrap()
    }

    #[test]
    fn test_trend_window_shrinks_at_start() {
        let series = RevenueSeries::from_daily_values(start(), &[7.0, 14.0, 21.0]).unwrap();
        let smoothed = TrendSmoother::default().smooth(&series).unwrap();

        let trends: Vec<f64> = smoothed.points().iter().map(|p| p.trend).collect();
        assert_eq!(trends, vec![7.0, 10.5, 14.0]);
        assert!(smoothed.points().iter().all(|p| p.baseline.is_none()));
    }

    #[test]
    fn test_trend_uses_last_seven_days() {
        let values: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let series = RevenueSeries::from_daily_values(start(), &values).unwrap();
        let smoothed = TrendSmoother::default().smooth(&series).unwrap();

        // mean of 4..=10
        assert_relative_eq!(smoothed.last_trend().unwrap(), 7.0);
    }

    #[test]
    fn test_baseline_defined_from_fourteenth_day() {
        let values: Vec<f64> = (1..=14).map(|v| v as f64).collect();
        let series = RevenueSeries::from_daily_values(start(), &values).unwrap();
        let smoothed = TrendSmoother::default().smooth(&series).unwrap();

        assert!(smoothed.points()[12].baseline.is_none());
        assert_relative_eq!(smoothed.last_baseline().unwrap(), 7.5);
    }

    #[test]
    fn test_empty_series() {
        let smoothed = TrendSmoother::default()
            .smooth(&RevenueSeries::default())
            .unwrap();
        assert!(smoothed.is_empty());
        assert_eq!(smoothed.last_trend(), None);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(TrendSmoother::new(0, 14).is_err());
    }
}
