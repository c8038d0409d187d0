//! # Commerce Portal Workspace
//!
//! Facade over the workspace crates:
//!
//! - [`commerce_math`]: trailing means and penalised least squares
//! - [`revenue_forecast`]: forecast reconciliation of daily revenue
//! - [`commerce_portal`]: ingestion, store access and the dashboard
//!
//! ## Example
//!
//! ```
//! use commerce_portal_workspace::revenue_forecast::{RevenueAnalysis, RevenueSeries};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
//! let series = RevenueSeries::from_daily_values(start, &[100.0; 30]).unwrap();
//! let report = RevenueAnalysis::default().run(&series).unwrap();
//! assert_eq!(report.metrics.current_7d_revenue, 700.0);
//! ```

pub use commerce_math;
pub use commerce_portal;
pub use revenue_forecast;
