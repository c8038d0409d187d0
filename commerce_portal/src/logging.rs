//! Tracing subscriber setup for the binaries

use crate::{PortalError, Result};
use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over `info`.
pub fn init(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| PortalError::Config(format!("Failed to initialise logging: {e}")))
}
