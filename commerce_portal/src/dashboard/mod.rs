//! Decision dashboard
//!
//! Five panels computed from the store. A panel that fails or has nothing
//! to show produces an explicit outcome instead of aborting the others.

pub mod experience;
pub mod forecasting;
pub mod health;
pub mod kpi;
pub mod logistics;
pub mod render;

pub use experience::ExperiencePanel;
pub use forecasting::ForecastPanel;
pub use health::HealthPanel;
pub use kpi::KpiPanel;
pub use logistics::LogisticsPanel;

use crate::config::PortalConfig;
use crate::store::Store;
use crate::{PortalError, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of computing one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "panel", rename_all = "snake_case")]
pub enum PanelOutcome<T> {
    Ready(T),
    /// The data behind the panel is absent
    NoData(String),
    /// A table the panel reads does not exist
    TableMissing(String),
    /// The panel could not be computed
    Failed(String),
}

impl<T> PanelOutcome<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelOutcome::Ready(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelOutcome::Ready(_))
    }
}

impl<T> From<Result<T>> for PanelOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(panel) => PanelOutcome::Ready(panel),
            Err(PortalError::EmptyResult(message)) => PanelOutcome::NoData(message),
            Err(PortalError::TableMissing(table)) => PanelOutcome::TableMissing(table),
            Err(err) => PanelOutcome::Failed(err.to_string()),
        }
    }
}

/// Every panel of one dashboard render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub kpis: PanelOutcome<KpiPanel>,
    pub forecast: PanelOutcome<ForecastPanel>,
    pub logistics: PanelOutcome<LogisticsPanel>,
    pub experience: PanelOutcome<ExperiencePanel>,
    pub health: PanelOutcome<HealthPanel>,
}

impl DashboardReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Dashboard over an open store
#[derive(Debug)]
pub struct Dashboard<'a> {
    store: &'a Store,
    config: &'a PortalConfig,
}

impl<'a> Dashboard<'a> {
    pub fn new(store: &'a Store, config: &'a PortalConfig) -> Self {
        Self { store, config }
    }

    /// Compute all panels from the current store contents
    pub fn render(&self) -> DashboardReport {
        info!(store = %self.store.path().display(), "rendering dashboard");
        DashboardReport {
            kpis: panel("kpi", || kpi::build(self.store)),
            forecast: panel("forecast", || forecasting::build(self.store, &self.config.forecast)),
            logistics: panel("logistics", || logistics::build(self.store, &self.config.geolocation)),
            experience: panel("experience", || experience::build(self.store)),
            health: panel("health", || health::build(self.store)),
        }
    }
}

fn panel<T>(name: &str, build: impl FnOnce() -> Result<T>) -> PanelOutcome<T> {
    let outcome = PanelOutcome::from(build());
    match &outcome {
        PanelOutcome::Ready(_) => debug!(panel = name, "panel ready"),
        PanelOutcome::NoData(message) => info!(panel = name, "no data: {message}"),
        PanelOutcome::TableMissing(table) => warn!(panel = name, "table '{table}' is missing"),
        PanelOutcome::Failed(message) => warn!(panel = name, "panel failed: {message}"),
    }
    outcome
}
