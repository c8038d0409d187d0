//! End-to-end revenue forecast reconciliation
//!
//! Runs the smoother, fits the model on the trailing window, reconciles the
//! forecast with the trend, detects shocks and derives the displayed
//! metrics. Everything is recomputed from the series on each call.

use crate::anomaly::{Anomaly, AnomalyDetector, DEFAULT_ANOMALY_THRESHOLD};
use crate::baseline::RollingBaseline;
use crate::data::RevenueSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{DisplayRange, RevenueMetrics};
use crate::models::flat_trend::{DEFAULT_CHANGEPOINT_PRIOR_SCALE, DEFAULT_INTERVAL_WIDTH};
use crate::models::{Changepoint, FlatTrendModel, ForecastModel, TrainedForecastModel};
use crate::reconcile::{Reconciler, Reconciliation};
use crate::smoothing::{SmoothedSeries, TrendSmoother, DEFAULT_BASELINE_WINDOW, DEFAULT_TREND_WINDOW};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tunables for the revenue forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Calendar days of history, before the last observed date, used for fitting
    pub fit_window_days: i64,
    /// Future days to predict
    pub horizon_days: usize,
    pub changepoint_prior_scale: f64,
    pub interval_width: f64,
    pub trend_window: usize,
    pub baseline_window: usize,
    pub anomaly_threshold: f64,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            fit_window_days: 90,
            horizon_days: 30,
            changepoint_prior_scale: DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            trend_window: DEFAULT_TREND_WINDOW,
            baseline_window: DEFAULT_BASELINE_WINDOW,
            anomaly_threshold: DEFAULT_ANOMALY_THRESHOLD,
            weekly_seasonality: true,
            daily_seasonality: true,
        }
    }
}

impl ForecastSettings {
    /// Build the forecasting model these settings describe
    pub fn model(&self) -> Result<FlatTrendModel> {
        FlatTrendModel::new()
            .with_changepoint_prior_scale(self.changepoint_prior_scale)?
            .with_interval_width(self.interval_width)
            .map(|m| {
                m.with_weekly_seasonality(self.weekly_seasonality)
                    .with_daily_seasonality(self.daily_seasonality)
            })
    }

    fn validate(&self) -> Result<()> {
        if self.fit_window_days < 1 {
            return Err(ForecastError::InvalidParameter(
                "Fit window must cover at least one day".to_string(),
            ));
        }
        if self.anomaly_threshold.is_nan() || self.anomaly_threshold <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Anomaly threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Everything the revenue panel displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub model_name: String,
    pub smoothed: SmoothedSeries,
    pub reconciliation: Reconciliation,
    pub baseline: RollingBaseline,
    /// Flat baseline line from the last observed date to the forecast end
    pub baseline_line: Option<[(NaiveDate, f64); 2]>,
    pub changepoints: Vec<Changepoint>,
    pub dominant_changepoint: Option<Changepoint>,
    pub anomalies: Vec<Anomaly>,
    pub metrics: RevenueMetrics,
    pub display_range: DisplayRange,
}

/// Forecast reconciliation pipeline
#[derive(Debug, Clone, Default)]
pub struct RevenueAnalysis {
    settings: ForecastSettings,
}

impl RevenueAnalysis {
    pub fn new(settings: ForecastSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Run the full pipeline with the configured flat-trend model
    pub fn run(&self, series: &RevenueSeries) -> Result<RevenueReport> {
        let model = self.settings.model()?;
        self.run_with(&model, series)
    }

    /// Run the full pipeline with any forecasting model
    pub fn run_with<M: ForecastModel>(&self, model: &M, series: &RevenueSeries) -> Result<RevenueReport> {
        if series.is_empty() {
            return Err(ForecastError::InsufficientData(
                "No revenue observations".to_string(),
            ));
        }

        let smoother = TrendSmoother::new(self.settings.trend_window, self.settings.baseline_window)?;
        let smoothed = smoother.smooth(series)?;

        let window = series.trailing_window(self.settings.fit_window_days);
        let trained = model.train(&window)?;
        let frame = trained.forecast(self.settings.horizon_days)?;

        let reconciliation = Reconciler::reconcile(&smoothed, &frame)?;

        let baseline = RollingBaseline::compute(series, self.settings.baseline_window);
        let baseline_line = baseline.line(reconciliation.last_observed(), reconciliation.display_end());

        let anomalies = AnomalyDetector::new(self.settings.anomaly_threshold)
            .detect(series, reconciliation.in_window());

        let metrics = RevenueMetrics::compute(series, &reconciliation, anomalies.len());
        let display_range =
            DisplayRange::compute(&smoothed, &reconciliation, self.settings.fit_window_days);

        Ok(RevenueReport {
            model_name: trained.name().to_string(),
            changepoints: trained.significant_changepoints(),
            dominant_changepoint: trained.dominant_changepoint(),
            smoothed,
            reconciliation,
            baseline,
            baseline_line,
            anomalies,
            metrics,
            display_range,
        })
    }
}
