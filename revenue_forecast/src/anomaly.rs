//! Shock detection on model residuals

use crate::data::RevenueSeries;
use crate::models::ForecastPoint;
use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::HashMap;

/// Default residual threshold in standard deviations
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 3.0;

/// Observed day whose residual is unusually large
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub observed: f64,
    pub predicted: f64,
    pub residual: f64,
    /// |residual| divided by the residual standard deviation
    pub score: f64,
}

/// Flags residuals larger than a multiple of their standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ANOMALY_THRESHOLD,
        }
    }
}

impl AnomalyDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Indices of residuals whose |residual| / sample std exceeds the threshold
    ///
    /// Nothing is flagged when the standard deviation is zero or undefined.
    pub fn flag_residuals(&self, residuals: &[f64]) -> Vec<usize> {
        match residual_std_dev(residuals) {
            Some(sd) => residuals
                .iter()
                .enumerate()
                .filter(|(_, r)| (*r / sd).abs() > self.threshold)
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Compare observations against in-window predictions joined by date
    ///
    /// Observed dates without a prediction are ignored.
    pub fn detect(&self, observed: &RevenueSeries, predictions: &[ForecastPoint]) -> Vec<Anomaly> {
        let predicted: HashMap<NaiveDate, f64> =
            predictions.iter().map(|p| (p.date, p.yhat)).collect();

        let joined: Vec<(NaiveDate, f64, f64)> = observed
            .points()
            .iter()
            .filter_map(|obs| predicted.get(&obs.date).map(|&yhat| (obs.date, obs.amount, yhat)))
            .collect();
        let residuals: Vec<f64> = joined.iter().map(|(_, y, yhat)| y - yhat).collect();

        let sd = match residual_std_dev(&residuals) {
            Some(sd) => sd,
            None => return Vec::new(),
        };

        self.flag_residuals(&residuals)
            .into_iter()
            .map(|i| {
                let (date, observed, predicted) = joined[i];
                Anomaly {
                    date,
                    observed,
                    predicted,
                    residual: residuals[i],
                    score: (residuals[i] / sd).abs(),
                }
            })
            .collect()
    }
}

/// Sample standard deviation, `None` if undefined or zero
fn residual_std_dev(residuals: &[f64]) -> Option<f64> {
    if residuals.len() < 2 {
        return None;
    }
    let sd = residuals.iter().std_dev();
    if sd.is_finite() && sd > 0.0 {
        Some(sd)
    } else {
        None
    }
}
