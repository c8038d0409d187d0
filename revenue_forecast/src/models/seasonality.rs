//! Fourier seasonality terms

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

/// Periodic component expressed as a truncated Fourier series
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    name: String,
    period_days: f64,
    fourier_order: usize,
}

impl Seasonality {
    pub fn new(name: &str, period_days: f64, fourier_order: usize) -> Self {
        Self {
            name: name.to_string(),
            period_days,
            fourier_order,
        }
    }

    /// Seven-day cycle, order 3
    pub fn weekly() -> Self {
        Self::new("weekly", 7.0, 3)
    }

    /// One-day cycle, order 4
    pub fn daily() -> Self {
        Self::new("daily", 1.0, 4)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of regressors this component contributes
    pub fn width(&self) -> usize {
        2 * self.fourier_order
    }

    /// Sine and cosine features at `date` (midnight)
    pub fn features(&self, date: NaiveDate) -> Vec<f64> {
        let t = date.num_days_from_ce() as f64;
        (1..=self.fourier_order)
            .flat_map(|n| {
                let angle = 2.0 * PI * n as f64 * t / self.period_days;
                [angle.sin(), angle.cos()]
            })
            .collect()
    }
}
