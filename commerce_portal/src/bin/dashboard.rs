//! Render the decision dashboard from the SQLite store.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commerce_portal::{logging, Dashboard, PortalConfig, Store};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Decision dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "COMMERCE_PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite store to read
    #[arg(long)]
    store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let mut config = PortalConfig::load_or_default(args.config.as_deref())?;
    if let Some(store) = args.store {
        config.store_path = store;
    }

    let store = Store::open_read_only(&config.store_path)?;
    let report = Dashboard::new(&store, &config).render();

    match args.format {
        Format::Text => print!("{report}"),
        Format::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
