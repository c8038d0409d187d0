//! Forecasting models for daily revenue

use crate::data::RevenueSeries;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt::Debug;

pub mod flat_trend;
pub mod seasonality;

pub use flat_trend::{FlatTrendModel, TrainedFlatTrend};
pub use seasonality::Seasonality;

/// Point prediction with its prediction interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    /// A point whose interval collapses onto the prediction
    pub fn exact(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            yhat: value,
            yhat_lower: value,
            yhat_upper: value,
        }
    }

    /// Shift the prediction and both bounds, then floor all three at zero
    pub fn shifted_non_negative(&self, offset: f64) -> Self {
        Self {
            date: self.date,
            yhat: (self.yhat + offset).max(0.0),
            yhat_lower: (self.yhat_lower + offset).max(0.0),
            yhat_upper: (self.yhat_upper + offset).max(0.0),
        }
    }
}

/// Structural shift detected in the fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Changepoint {
    pub date: NaiveDate,
    /// Level shift in revenue units
    pub delta: f64,
    /// Whether the shift is large enough to annotate
    pub significant: bool,
}

/// Model output over the fitted history and the forecast horizon
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastFrame {
    points: Vec<ForecastPoint>,
}

impl ForecastFrame {
    /// Create a frame, sorting the points by date
    pub fn new(mut points: Vec<ForecastPoint>) -> Result<Self> {
        points.sort_by_key(|p| p.date);
        if points.windows(2).any(|w| w[0].date == w[1].date) {
            return Err(ForecastError::ValidationError(
                "Forecast frame contains duplicate dates".to_string(),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Split into predictions on or before `last_observed` and those after it
    pub fn partition(&self, last_observed: NaiveDate) -> (Vec<ForecastPoint>, Vec<ForecastPoint>) {
        self.points
            .iter()
            .copied()
            .partition(|p| p.date <= last_observed)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Predict values and intervals for arbitrary dates
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>>;

    /// Dates the model was fitted on
    fn history_dates(&self) -> &[NaiveDate];

    /// Candidate changepoints with their fitted shifts
    fn changepoints(&self) -> &[Changepoint];

    /// Name of the model
    fn name(&self) -> &str;

    /// Predict the fitted history plus `horizon` future days
    fn forecast(&self, horizon: usize) -> Result<ForecastFrame> {
        let mut dates = self.history_dates().to_vec();
        if let Some(&last) = dates.last() {
            dates.extend(future_dates(last, horizon));
        }
        ForecastFrame::new(self.predict(&dates)?)
    }

    /// Changepoints whose shift is large enough to annotate
    fn significant_changepoints(&self) -> Vec<Changepoint> {
        self.changepoints()
            .iter()
            .copied()
            .filter(|c| c.significant)
            .collect()
    }

    /// Significant changepoint with the largest absolute shift
    fn dominant_changepoint(&self) -> Option<Changepoint> {
        self.changepoints()
            .iter()
            .copied()
            .filter(|c| c.significant)
            .max_by(|a, b| a.delta.abs().total_cmp(&b.delta.abs()))
    }
}

/// Forecast model that can be trained on a revenue series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a revenue series
    fn train(&self, series: &RevenueSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .map(|d| last + Duration::days(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 8, d).unwrap()
    }

    #[test]
    fn test_future_dates() {
        let september = |d| NaiveDate::from_ymd_opt(2018, 9, d).unwrap();
        assert_eq!(
            future_dates(day(30), 3),
            vec![day(31), september(1), september(2)]
        );
        assert!(future_dates(day(1), 0).is_empty());
    }

    #[test]
    fn test_partition_on_last_observed() {
        let frame = ForecastFrame::new(vec![
            ForecastPoint::exact(day(3), 3.0),
            ForecastPoint::exact(day(1), 1.0),
            ForecastPoint::exact(day(2), 2.0),
        ])
        .unwrap();

        let (history, future) = frame.partition(day(2));
        assert_eq!(history.len(), 2);
        assert_eq!(future, vec![ForecastPoint::exact(day(3), 3.0)]);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let result = ForecastFrame::new(vec![
            ForecastPoint::exact(day(1), 1.0),
            ForecastPoint::exact(day(1), 2.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_shift_floors_at_zero() {
        let point = ForecastPoint {
            date: day(1),
            yhat: 10.0,
            yhat_lower: 2.0,
            yhat_upper: 18.0,
        };
        let shifted = point.shifted_non_negative(-5.0);
        assert_eq!(shifted.yhat, 5.0);
        assert_eq!(shifted.yhat_lower, 0.0);
        assert_eq!(shifted.yhat_upper, 13.0);
    }
}
