//! Load the dataset CSV exports into the SQLite store.

use anyhow::{Context, Result};
use clap::Parser;
use commerce_portal::{logging, Ingestor, PortalConfig, Store};
use std::path::PathBuf;
use tracing::info;

/// Dataset ingestion
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "COMMERCE_PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the CSV exports
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// SQLite store to write
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let mut config = PortalConfig::load_or_default(args.config.as_deref())?;
    if let Some(source) = args.source {
        config.source_dir = source;
    }
    if let Some(store) = args.store {
        config.store_path = store;
    }

    info!(
        source = %config.source_dir.display(),
        store = %config.store_path.display(),
        "starting ingestion"
    );
    let mut store = Store::create(&config.store_path)
        .with_context(|| format!("cannot create store at {}", config.store_path.display()))?;
    let report = Ingestor::new(&config.source_dir, config.geolocation).run(&mut store)?;

    if !report.skipped.is_empty() {
        info!("Skipped missing exports: {}", report.skipped.join(", "));
    }
    Ok(())
}
