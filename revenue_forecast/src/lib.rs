//! # Revenue Forecast
//!
//! A Rust library for smoothing daily revenue, forecasting it and stitching
//! the forecast onto the observed trend for display.
//!
//! ## Features
//!
//! - Daily revenue series handling with CSV loading
//! - Trailing trend (7-day) and baseline (14-day) smoothing
//! - Flat-trend additive forecasting model with weekly and daily seasonality
//! - Reconciliation of the forecast with the observed trend
//! - Shock detection on model residuals
//!
//! ## Quick Start
//!
//! ```no_run
//! use revenue_forecast::{ForecastSettings, RevenueAnalysis, RevenueLoader};
//!
//! # fn main() -> revenue_forecast::Result<()> {
//! let series = RevenueLoader::from_csv("daily_revenue.csv")?;
//! let analysis = RevenueAnalysis::new(ForecastSettings::default())?;
//! let report = analysis.run(&series)?;
//!
//! match report.metrics.forecast_trend_pct {
//!     Some(pct) => println!("Forecast trend: {:+.1}%", pct),
//!     None => println!("Forecast trend: N/A"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod anomaly;
pub mod baseline;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod reconcile;
pub mod smoothing;

// Re-export commonly used types
pub use crate::analysis::{ForecastSettings, RevenueAnalysis, RevenueReport};
pub use crate::anomaly::{Anomaly, AnomalyDetector};
pub use crate::baseline::RollingBaseline;
pub use crate::data::{DailyRevenue, RevenueLoader, RevenueSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{DisplayRange, RevenueMetrics};
pub use crate::models::{
    Changepoint, FlatTrendModel, ForecastFrame, ForecastModel, ForecastPoint,
    TrainedForecastModel,
};
pub use crate::reconcile::{Reconciler, Reconciliation};
pub use crate::smoothing::{SmoothedSeries, TrendSmoother};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
