//! Portal configuration
//!
//! Every field has a default, so running without a configuration file
//! reproduces the fixed store location and forecast tunables.

use crate::{PortalError, Result};
use revenue_forecast::ForecastSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Geographic bounding box for geolocation rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            lat_min: -33.75,
            lat_max: 5.27,
            lng_min: -73.99,
            lng_max: -34.79,
        }
    }
}

impl GeoBounds {
    /// Inclusive containment test
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lng >= self.lng_min && lng <= self.lng_max
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// SQLite database file
    pub store_path: PathBuf,
    /// Directory holding the dataset CSV exports
    pub source_dir: PathBuf,
    pub forecast: ForecastSettings,
    pub geolocation: GeoBounds,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("database").join("ecommerce.db"),
            source_dir: PathBuf::from("data"),
            forecast: ForecastSettings::default(),
            geolocation: GeoBounds::default(),
        }
    }
}

impl PortalConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PortalError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::Config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            PortalError::Config(format!(
                "Failed to parse TOML in '{}': {e}",
                path.display()
            ))
        })
    }

    /// Load the given file, or fall back to defaults when none is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
