//! Forecast reconciliation
//!
//! Pins the model's future predictions to the end of the observed trend line
//! and prepends a bridge point so trend and forecast draw as one line.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastFrame, ForecastPoint};
use crate::smoothing::SmoothedSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Model output stitched onto the observed trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    last_observed: NaiveDate,
    last_trend: f64,
    offset: Option<f64>,
    in_window: Vec<ForecastPoint>,
    future: Vec<ForecastPoint>,
    display: Vec<ForecastPoint>,
}

impl Reconciliation {
    /// Last observed date
    pub fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    /// Trend value at the last observed date
    pub fn last_trend(&self) -> f64 {
        self.last_trend
    }

    /// Shift applied to every future prediction, `None` without future points
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Predictions on or before the last observed date, unadjusted
    pub fn in_window(&self) -> &[ForecastPoint] {
        &self.in_window
    }

    /// Future predictions after offset and zero floor
    pub fn future(&self) -> &[ForecastPoint] {
        &self.future
    }

    /// Bridge point followed by the adjusted future predictions
    ///
    /// Empty when the model produced no future predictions.
    pub fn display(&self) -> &[ForecastPoint] {
        &self.display
    }

    /// Last date covered by the displayable forecast, or the last observed date
    pub fn display_end(&self) -> NaiveDate {
        self.display
            .last()
            .map(|p| p.date)
            .unwrap_or(self.last_observed)
    }

    /// Highest adjusted upper bound in the displayable forecast
    pub fn max_upper(&self) -> Option<f64> {
        self.display.iter().map(|p| p.yhat_upper).reduce(f64::max)
    }
}

/// Stitches model output onto the observed trend
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    /// Reconcile a forecast frame with the smoothed observations
    pub fn reconcile(smoothed: &SmoothedSeries, frame: &ForecastFrame) -> Result<Reconciliation> {
        let last = smoothed.points().last().ok_or_else(|| {
            ForecastError::InsufficientData("No observed revenue to reconcile against".to_string())
        })?;
        let last_observed = last.date;
        let last_trend = last.trend;

        let (in_window, raw_future) = frame.partition(last_observed);

        let (offset, future, display) = match raw_future.first() {
            Some(first) => {
                let offset = last_trend - first.yhat;
                let future: Vec<ForecastPoint> = raw_future
                    .iter()
                    .map(|p| p.shifted_non_negative(offset))
                    .collect();

                let mut display = Vec::with_capacity(future.len() + 1);
                display.push(ForecastPoint::exact(last_observed, last_trend));
                display.extend(future.iter().copied());
                (Some(offset), future, display)
            }
            None => (None, Vec::new(), Vec::new()),
        };

        Ok(Reconciliation {
            last_observed,
            last_trend,
            offset,
            in_window,
            future,
            display,
        })
    }
}
