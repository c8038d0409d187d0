//! Trailing moving average calculations
//!
//! A [`TrailingMean`] keeps a fixed-size window of the most recent values and
//! reports their mean once at least `min_periods` values have been seen. With
//! `min_periods == period` it behaves like a strict simple moving average;
//! with `min_periods == 1` the window shrinks at the start of the series.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Trailing mean over a sliding window with a minimum-period rule
#[derive(Debug, Clone)]
pub struct TrailingMean {
    period: usize,
    min_periods: usize,
    values: VecDeque<f64>,
}

impl TrailingMean {
    /// Create a strict trailing mean that needs a full window before reporting
    pub fn new(period: usize) -> Result<Self> {
        Self::with_min_periods(period, period)
    }

    /// Create a trailing mean that reports once `min_periods` values are available
    pub fn with_min_periods(period: usize, min_periods: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }
        if min_periods == 0 || min_periods > period {
            return Err(MathError::InvalidInput(format!(
                "Minimum periods must be between 1 and {}, got {}",
                period, min_periods
            )));
        }

        Ok(Self {
            period,
            min_periods,
            values: VecDeque::with_capacity(period),
        })
    }

    /// Push a new value into the window
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Cannot average non-finite value {}",
                value
            )));
        }

        self.values.push_back(value);

        // Remove oldest value if we have more than period values
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        Ok(())
    }

    /// Get the current mean, if enough values have been seen
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.min_periods {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for trailing mean. Need {} values, have {}.",
                self.min_periods,
                self.values.len()
            )));
        }

        let sum: f64 = self.values.iter().sum();
        Ok(sum / self.values.len() as f64)
    }

    /// Current mean, or `None` while the minimum-period rule is unmet
    pub fn current(&self) -> Option<f64> {
        self.value().ok()
    }

    /// Get the window length
    pub fn period(&self) -> usize {
        self.period
    }

    /// Get the number of values required before a mean is reported
    pub fn min_periods(&self) -> usize {
        self.min_periods
    }

    /// Reset the window, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Trailing means for every position of `values`
///
/// Positions before `min_periods` values are available are `None`.
pub fn trailing_means(values: &[f64], period: usize, min_periods: usize) -> Result<Vec<Option<f64>>> {
    let mut mean = TrailingMean::with_min_periods(period, min_periods)?;
    let mut out = Vec::with_capacity(values.len());
    for &value in values {
        mean.update(value)?;
        out.push(mean.current());
    }
    Ok(out)
}
