//! Flat-trend additive model
//!
//! The fitted curve is a piecewise-constant level plus Fourier seasonality:
//!
//! ```text
//! y(t) = k + Σ δ_j · 1[t ≥ s_j] + Σ seasonal_i(t)
//! ```
//!
//! Level shifts `δ_j` sit on candidate changepoints `s_j` spread over the
//! first part of the history. Coefficients are the maximum a-posteriori
//! estimate under independent Gaussian priors, solved as a ridge problem on a
//! target scaled by its largest absolute value. The level never extrapolates:
//! every date after the history uses the level reached at the end of it.

use crate::data::RevenueSeries;
use crate::error::{ForecastError, Result};
use crate::models::{Changepoint, ForecastModel, ForecastPoint, Seasonality, TrainedForecastModel};
use chrono::NaiveDate;
use commerce_math::{solve_penalized_least_squares, DesignMatrix};
use statrs::distribution::{ContinuousCDF, Normal};

/// Default prior scale on level shifts
pub const DEFAULT_CHANGEPOINT_PRIOR_SCALE: f64 = 0.02;
/// Default prediction interval coverage
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.95;

/// Shifts smaller than this (in scaled units) are not annotated
const SIGNIFICANT_SHIFT: f64 = 0.01;
/// Lower bound on the scaled observation noise
const MIN_NOISE: f64 = 0.01;

/// Flat-trend additive forecasting model
#[derive(Debug, Clone)]
pub struct FlatTrendModel {
    /// Name of the model
    name: String,
    /// Maximum number of candidate changepoints
    n_changepoints: usize,
    /// Share of the history in which changepoints may be placed
    changepoint_range: f64,
    /// Prior scale on level shifts
    changepoint_prior_scale: f64,
    /// Prior scale on seasonal coefficients
    seasonality_prior_scale: f64,
    /// Prior scale on the base level
    level_prior_scale: f64,
    /// Prediction interval coverage
    interval_width: f64,
    /// Number of noise re-estimation passes
    noise_refits: usize,
    /// Seasonal components
    seasonalities: Vec<Seasonality>,
}

impl Default for FlatTrendModel {
    fn default() -> Self {
        Self {
            name: "Flat Trend".to_string(),
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            seasonality_prior_scale: 10.0,
            level_prior_scale: 5.0,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            noise_refits: 3,
            seasonalities: vec![Seasonality::weekly(), Seasonality::daily()],
        }
    }
}

impl FlatTrendModel {
    /// Create a model with weekly and daily seasonality and default priors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prior scale on level shifts
    pub fn with_changepoint_prior_scale(mut self, scale: f64) -> Result<Self> {
        if scale <= 0.0 || !scale.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "Changepoint prior scale must be positive".to_string(),
            ));
        }
        self.changepoint_prior_scale = scale;
        Ok(self)
    }

    /// Set the prediction interval coverage
    pub fn with_interval_width(mut self, width: f64) -> Result<Self> {
        if width <= 0.0 || width >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Interval width must be between 0 and 1".to_string(),
            ));
        }
        self.interval_width = width;
        Ok(self)
    }

    /// Set the maximum number of candidate changepoints
    pub fn with_n_changepoints(mut self, n: usize) -> Self {
        self.n_changepoints = n;
        self
    }

    /// Enable or disable the weekly component
    pub fn with_weekly_seasonality(self, enabled: bool) -> Self {
        self.toggle_seasonality(Seasonality::weekly(), enabled)
    }

    /// Enable or disable the daily component
    pub fn with_daily_seasonality(self, enabled: bool) -> Self {
        self.toggle_seasonality(Seasonality::daily(), enabled)
    }

    fn toggle_seasonality(mut self, seasonality: Seasonality, enabled: bool) -> Self {
        self.seasonalities.retain(|s| s.name() != seasonality.name());
        if enabled {
            self.seasonalities.push(seasonality);
        }
        self
    }

    pub fn changepoint_prior_scale(&self) -> f64 {
        self.changepoint_prior_scale
    }

    pub fn interval_width(&self) -> f64 {
        self.interval_width
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    /// Row indices used as candidate changepoints
    fn changepoint_indices(&self, n_rows: usize) -> Vec<usize> {
        let hist_size = (n_rows as f64 * self.changepoint_range).floor() as usize;
        let n = self.n_changepoints.min(hist_size.saturating_sub(1));
        if n == 0 {
            return Vec::new();
        }

        let last = (hist_size - 1) as f64;
        let mut indices: Vec<usize> = (1..=n)
            .map(|i| (last * i as f64 / n as f64).round() as usize)
            .collect();
        indices.dedup();
        indices
    }
}

impl ForecastModel for FlatTrendModel {
    type Trained = TrainedFlatTrend;

    fn train(&self, series: &RevenueSeries) -> Result<Self::Trained> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData(format!(
                "Model fitting needs at least 2 distinct dates, have {}",
                series.len()
            )));
        }

        let dates = series.dates();
        let amounts = series.amounts();
        let n = amounts.len();

        let y_scale = amounts.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let targets: Vec<f64> = amounts.iter().map(|v| v / y_scale).collect();

        let changepoint_dates: Vec<NaiveDate> = self
            .changepoint_indices(n)
            .into_iter()
            .map(|i| dates[i])
            .collect();

        let layout = FeatureLayout::new(&dates, changepoint_dates.clone(), self.seasonalities.clone());
        let rows: Vec<Vec<f64>> = dates.iter().map(|&d| layout.features(d)).collect();
        let design = DesignMatrix::from_rows(&rows)?;

        // Prior scale per column
        let mut prior_scales = vec![self.level_prior_scale];
        prior_scales.extend(
            std::iter::repeat(self.changepoint_prior_scale).take(changepoint_dates.len()),
        );
        let seasonal_width: usize = self.seasonalities.iter().map(Seasonality::width).sum();
        prior_scales.extend(std::iter::repeat(self.seasonality_prior_scale).take(seasonal_width));

        let mean = targets.iter().sum::<f64>() / n as f64;
        let variance = targets.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n as f64;
        let mut sigma = variance.sqrt().max(MIN_NOISE);

        let mut beta = Vec::new();
        for _ in 0..=self.noise_refits {
            let penalties: Vec<f64> = prior_scales
                .iter()
                .map(|s| sigma.powi(2) / s.powi(2))
                .collect();
            beta = solve_penalized_least_squares(&design, &targets, &penalties)?;

            let fitted = design.multiply(&beta)?;
            let sse: f64 = fitted
                .iter()
                .zip(&targets)
                .map(|(f, y)| (y - f).powi(2))
                .sum();
            sigma = (sse / n as f64).sqrt().max(MIN_NOISE);
        }

        let deltas = &beta[1..1 + changepoint_dates.len()];
        let changepoints: Vec<Changepoint> = changepoint_dates
            .iter()
            .zip(deltas)
            .map(|(&date, &delta)| Changepoint {
                date,
                delta: delta * y_scale,
                significant: delta.abs() >= SIGNIFICANT_SHIFT,
            })
            .collect();

        let mean_abs_shift = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
        };
        let span_days = (dates[n - 1] - dates[0]).num_days() as f64;
        let changepoint_rate = changepoint_dates.len() as f64 / span_days;

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ValidationError(format!("Normal distribution: {}", e)))?;
        let z = normal.inverse_cdf((1.0 + self.interval_width) / 2.0);

        Ok(TrainedFlatTrend {
            name: self.name.clone(),
            layout,
            beta,
            y_scale,
            sigma,
            z,
            mean_abs_shift,
            changepoint_rate,
            history: dates,
            changepoints,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Column layout shared by fitting and prediction
///
/// Seasonal columns are centred on their mean over the history so the level
/// column alone carries the average revenue.
#[derive(Debug, Clone)]
struct FeatureLayout {
    changepoint_dates: Vec<NaiveDate>,
    seasonalities: Vec<Seasonality>,
    seasonal_means: Vec<f64>,
}

impl FeatureLayout {
    fn new(history: &[NaiveDate], changepoint_dates: Vec<NaiveDate>, seasonalities: Vec<Seasonality>) -> Self {
        let width: usize = seasonalities.iter().map(Seasonality::width).sum();
        let mut seasonal_means = vec![0.0; width];
        for &date in history {
            let raw = seasonalities.iter().flat_map(|s| s.features(date));
            for (mean, value) in seasonal_means.iter_mut().zip(raw) {
                *mean += value;
            }
        }
        for mean in &mut seasonal_means {
            *mean /= history.len().max(1) as f64;
        }

        Self {
            changepoint_dates,
            seasonalities,
            seasonal_means,
        }
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let mut row = vec![1.0];
        row.extend(
            self.changepoint_dates
                .iter()
                .map(|&cp| if date >= cp { 1.0 } else { 0.0 }),
        );
        let seasonal = self.seasonalities.iter().flat_map(|s| s.features(date));
        row.extend(seasonal.zip(&self.seasonal_means).map(|(v, mean)| v - mean));
        row
    }
}

/// Trained flat-trend model
#[derive(Debug, Clone)]
pub struct TrainedFlatTrend {
    /// Name of the model
    name: String,
    layout: FeatureLayout,
    /// Fitted coefficients in scaled units
    beta: Vec<f64>,
    /// Target scale
    y_scale: f64,
    /// Observation noise in scaled units
    sigma: f64,
    /// Standard-normal quantile for the interval
    z: f64,
    mean_abs_shift: f64,
    /// Expected changepoints per day of history
    changepoint_rate: f64,
    history: Vec<NaiveDate>,
    changepoints: Vec<Changepoint>,
}

impl TrainedFlatTrend {
    /// Observation noise in revenue units
    pub fn noise(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Last fitted level in revenue units, held flat over the horizon
    pub fn final_level(&self) -> f64 {
        self.beta[..1 + self.layout.changepoint_dates.len()]
            .iter()
            .sum::<f64>()
            * self.y_scale
    }

    fn interval_sd(&self, date: NaiveDate) -> f64 {
        let last = self.history[self.history.len() - 1];
        let ahead = (date - last).num_days();
        if ahead <= 0 {
            return self.sigma;
        }
        let drift = ahead as f64 * self.changepoint_rate * 2.0 * self.mean_abs_shift.powi(2);
        (self.sigma.powi(2) + drift).sqrt()
    }
}

impl TrainedForecastModel for TrainedFlatTrend {
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastPoint>> {
        Ok(dates
            .iter()
            .map(|&date| {
                let row = self.layout.features(date);
                let scaled: f64 = row.iter().zip(&self.beta).map(|(x, b)| x * b).sum();
                let margin = self.z * self.interval_sd(date);
                ForecastPoint {
                    date,
                    yhat: scaled * self.y_scale,
                    yhat_lower: (scaled - margin) * self.y_scale,
                    yhat_upper: (scaled + margin) * self.y_scale,
                }
            })
            .collect())
    }

    fn history_dates(&self) -> &[NaiveDate] {
        &self.history
    }

    fn changepoints(&self) -> &[Changepoint] {
        &self.changepoints
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()
    }

    #[test]
    fn test_changepoints_in_first_eighty_percent() {
        let model = FlatTrendModel::new();
        let indices = model.changepoint_indices(91);
        assert_eq!(indices.len(), 25);
        assert_eq!(*indices.last().unwrap(), 71);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_short_history_has_fewer_changepoints() {
        let model = FlatTrendModel::new();
        assert!(model.changepoint_indices(2).is_empty());
        assert_eq!(model.changepoint_indices(5).len(), 3);
    }

    #[test]
    fn test_constant_series_is_reproduced() {
        let series = RevenueSeries::from_daily_values(start(), &[50.0; 40]).unwrap();
        let trained = FlatTrendModel::new().train(&series).unwrap();
        let frame = trained.forecast(10).unwrap();

        assert_eq!(frame.len(), 50);
        for point in frame.points() {
            assert_relative_eq!(point.yhat, 50.0, epsilon = 0.5);
            assert!(point.yhat_lower <= point.yhat && point.yhat <= point.yhat_upper);
        }
    }

    #[test]
    fn test_interval_widens_over_horizon() {
        let values: Vec<f64> = (0..60)
            .map(|i| {
                let level = if i < 30 { 10.0 } else { 20.0 };
                level + (i % 3) as f64
            })
            .collect();
        let series = RevenueSeries::from_daily_values(start(), &values).unwrap();
        let trained = FlatTrendModel::new().train(&series).unwrap();
        let frame = trained.forecast(30).unwrap();

        let width = |p: &ForecastPoint| p.yhat_upper - p.yhat_lower;
        let points = frame.points();
        assert!(width(&points[points.len() - 1]) >= width(&points[60]));
    }

    #[test]
    fn test_single_day_cannot_be_fitted() {
        let series = RevenueSeries::from_daily_values(start(), &[10.0]).unwrap();
        let err = FlatTrendModel::new().train(&series).unwrap_err();
        assert!(err.is_insufficient_data());
    }

    #[test]
    fn test_parameter_validation() {
        assert!(FlatTrendModel::new().with_interval_width(1.5).is_err());
        assert!(FlatTrendModel::new().with_changepoint_prior_scale(0.0).is_err());
    }

    #[test]
    fn test_toggle_seasonality() {
        let model = FlatTrendModel::new()
            .with_daily_seasonality(false)
            .with_weekly_seasonality(true);
        assert_eq!(model.seasonalities().len(), 1);
        assert_eq!(model.seasonalities()[0].name(), "weekly");
    }
}
