//! # Commerce Portal
//!
//! Ingestion and decision dashboard for an e-commerce order dataset.
//!
//! Two independent flows share only the SQLite store:
//!
//! - **Ingestion** ([`ingest`]) loads the dataset CSV exports into the store,
//!   cleaning geolocation rows and indexing order identifiers.
//! - **Dashboard** ([`dashboard`]) reads the store and computes five panels
//!   (KPIs, revenue forecast, logistics heatmap, delivery experience and
//!   pipeline health), each isolated from the others' failures.
//!
//! ## Usage Example
//!
//! ```no_run
//! use commerce_portal::{Dashboard, PortalConfig, Store};
//!
//! # fn main() -> commerce_portal::Result<()> {
//! let config = PortalConfig::default();
//! let store = Store::open_read_only(&config.store_path)?;
//! let report = Dashboard::new(&store, &config).render();
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod store;

pub use config::{GeoBounds, PortalConfig};
pub use dashboard::{Dashboard, DashboardReport, PanelOutcome};
pub use ingest::{IngestReport, Ingestor};
pub use store::{Store, TableStatus};

/// Errors that can occur in the portal
#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Store unreachable at {path}: {reason}")]
    StoreUnreachable { path: String, reason: String },

    #[error("Table '{0}' does not exist in the store")]
    TableMissing(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("Invalid source data: {0}")]
    InvalidSource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Forecast error: {0}")]
    Forecast(#[from] revenue_forecast::ForecastError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for portal operations
pub type Result<T> = std::result::Result<T, PortalError>;
