//! Rolling baseline reference line

use crate::data::RevenueSeries;
use chrono::NaiveDate;
use serde::Serialize;

/// Long-window average of observed revenue at the last observed day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingBaseline {
    window: usize,
    value: Option<f64>,
}

impl RollingBaseline {
    /// Compute the baseline over the trailing `window` observations
    ///
    /// The value is undefined when fewer than `window` days were observed.
    pub fn compute(series: &RevenueSeries, window: usize) -> Self {
        let amounts = series.amounts();
        let value = if window > 0 && amounts.len() >= window {
            let tail = &amounts[amounts.len() - window..];
            Some(tail.iter().sum::<f64>() / window as f64)
        } else {
            None
        };

        Self { window, value }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Flat reference line between two dates, if the baseline is defined
    pub fn line(&self, from: NaiveDate, to: NaiveDate) -> Option<[(NaiveDate, f64); 2]> {
        self.value.map(|v| [(from, v), (to, v)])
    }
}
