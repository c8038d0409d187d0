//! Dataset ingestion
//!
//! Loads the CSV exports found in the source directory into the store, one
//! table per file. Each table is replaced wholesale, so re-running the
//! ingestion is idempotent.

pub mod geolocation;
pub mod table;

pub use table::{Column, ColumnType, TableData};

use crate::config::GeoBounds;
use crate::store::Store;
use crate::{PortalError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Dataset export files and the tables they load into
pub const DATASET_FILES: [(&str, &str); 8] = [
    ("olist_customers_dataset.csv", "customers"),
    ("olist_orders_dataset.csv", "orders"),
    ("olist_order_items_dataset.csv", "order_items"),
    ("olist_products_dataset.csv", "products"),
    ("olist_sellers_dataset.csv", "sellers"),
    ("olist_order_payments_dataset.csv", "payments"),
    ("olist_order_reviews_dataset.csv", "reviews"),
    ("olist_geolocation_dataset.csv", "geolocation"),
];

/// Tables that get an `order_id` index after loading
pub const INDEXED_TABLES: [&str; 2] = ["orders", "order_items"];

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// (table, rows written), in load order
    pub loaded: Vec<(String, usize)>,
    /// Export files that were not found
    pub skipped: Vec<String>,
    pub indexes: Vec<String>,
}

impl IngestReport {
    pub fn rows_for(&self, table: &str) -> Option<usize> {
        self.loaded.iter().find(|(t, _)| t == table).map(|(_, rows)| *rows)
    }
}

/// Loads the dataset exports into a store
#[derive(Debug, Clone)]
pub struct Ingestor {
    source_dir: PathBuf,
    bounds: GeoBounds,
}

impl Ingestor {
    pub fn new<P: AsRef<Path>>(source_dir: P, bounds: GeoBounds) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            bounds,
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn run(&self, store: &mut Store) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for (file, table) in DATASET_FILES {
            let path = self.source_dir.join(file);
            if !path.is_file() {
                warn!(file = %path.display(), "dataset export not found, skipping");
                report.skipped.push(file.to_string());
                continue;
            }

            let data = self.load_file(&path, table)?;
            let rows = data.write(store.connection_mut(), table)?;
            info!("Processing {file} -> {table} ({rows} rows)");
            report.loaded.push((table.to_string(), rows));

            if INDEXED_TABLES.contains(&table) {
                if data.has_column("order_id") {
                    let index = format!("idx_{table}_order_id");
                    store.connection().execute(
                        &format!("CREATE INDEX IF NOT EXISTS {index} ON {table} (order_id)"),
                        [],
                    )?;
                    report.indexes.push(index);
                } else {
                    warn!(table, "no order_id column, index not created");
                }
            }
        }

        info!(
            "Ingestion complete: {} tables written to {}",
            report.loaded.len(),
            store.path().display()
        );
        Ok(report)
    }

    fn load_file(&self, path: &Path, table: &str) -> Result<TableData> {
        let (headers, records) = read_records(path)?;
        if table == "geolocation" {
            let raw_rows = records.len();
            let cleaned = geolocation::clean(&headers, &records, &self.bounds)?;
            info!(
                "Cleaned geolocation: {raw_rows} raw rows -> {} zip-code prefixes",
                cleaned.len()
            );
            Ok(cleaned)
        } else {
            TableData::from_records(headers, records)
        }
    }
}

fn read_records(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(PortalError::InvalidSource(format!(
            "{} has no header row",
            path.display()
        )));
    }

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, records))
}
