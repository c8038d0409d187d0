//! SQLite store access
//!
//! The store is the only thing shared between ingestion and the dashboard.
//! Ingestion writes through [`Store::create`]; the dashboard only ever opens
//! it read-only and runs the projections below.

use crate::{PortalError, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tables watched by the health panel
pub const MONITORED_TABLES: [&str; 5] = ["orders", "order_items", "customers", "geolocation", "reviews"];

/// Existence and row count of one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "rows")]
pub enum TableStatus {
    Online(u64),
    Empty,
    Missing,
}

impl TableStatus {
    pub fn row_count(&self) -> u64 {
        match self {
            TableStatus::Online(rows) => *rows,
            TableStatus::Empty | TableStatus::Missing => 0,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, TableStatus::Online(_))
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Online(_) => write!(f, "Online"),
            TableStatus::Empty => write!(f, "Empty"),
            TableStatus::Missing => write!(f, "Missing"),
        }
    }
}

/// Headline figures over delivered orders
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_revenue: Option<f64>,
    pub avg_delivery_days: Option<f64>,
    pub avg_review_score: Option<f64>,
    pub total_orders: u64,
}

/// One geolocation coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Review score paired with the delivery time of its order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeliveryReview {
    pub review_score: f64,
    pub delivery_days: f64,
}

/// Handle on the SQLite store
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open an existing store without write access
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PortalError::StoreUnreachable {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| PortalError::StoreUnreachable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Opening is lazy; touch the schema so a corrupt file fails here.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| PortalError::StoreUnreachable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), "opened store read-only");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open or create a writable store, creating the parent directory
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened store for writing");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn require_tables(&self, tables: &[&str]) -> Result<()> {
        for table in tables {
            if !self.table_exists(table)? {
                return Err(PortalError::TableMissing(table.to_string()));
            }
        }
        Ok(())
    }

    /// Row count of a table, failing with `TableMissing` when absent
    pub fn row_count(&self, table: &str) -> Result<u64> {
        self.require_tables(&[table])?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    pub fn table_status(&self, table: &str) -> Result<TableStatus> {
        if !self.table_exists(table)? {
            return Ok(TableStatus::Missing);
        }
        Ok(match self.row_count(table)? {
            0 => TableStatus::Empty,
            rows => TableStatus::Online(rows),
        })
    }

    pub fn kpi_summary(&self) -> Result<KpiSummary> {
        self.require_tables(&["orders", "order_items", "reviews"])?;
        let summary = self.conn.query_row(
            "SELECT
                SUM(i.price),
                AVG(julianday(o.order_delivered_customer_date) - julianday(o.order_purchase_timestamp)),
                (SELECT AVG(review_score) FROM reviews),
                COUNT(DISTINCT o.order_id)
             FROM order_items i
             JOIN orders o ON i.order_id = o.order_id
             WHERE o.order_status = 'delivered'",
            [],
            |row| {
                Ok(KpiSummary {
                    total_revenue: row.get(0)?,
                    avg_delivery_days: row.get(1)?,
                    avg_review_score: row.get(2)?,
                    total_orders: row.get::<_, i64>(3)?.max(0) as u64,
                })
            },
        )?;
        Ok(summary)
    }

    /// Delivered revenue per purchase day, ascending
    pub fn daily_revenue(&self) -> Result<Vec<(NaiveDate, f64)>> {
        self.require_tables(&["orders", "order_items"])?;
        let mut stmt = self.conn.prepare(
            "SELECT date(o.order_purchase_timestamp) AS ds, SUM(oi.price) AS y
             FROM orders o
             JOIN order_items oi ON o.order_id = oi.order_id
             WHERE o.order_status = 'delivered'
             GROUP BY 1
             ORDER BY 1 ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;

        let mut daily = Vec::new();
        for row in rows {
            let (day, amount) = row?;
            let (Some(day), Some(amount)) = (day, amount) else {
                continue;
            };
            match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(date) => daily.push((date, amount)),
                Err(_) => debug!(day = %day, "skipping unparseable purchase day"),
            }
        }
        Ok(daily)
    }

    pub fn geolocation_points(&self) -> Result<Vec<GeoPoint>> {
        self.require_tables(&["geolocation"])?;
        let mut stmt = self
            .conn
            .prepare("SELECT geolocation_lat, geolocation_lng FROM geolocation")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;

        let mut points = Vec::new();
        for row in rows {
            if let (Some(lat), Some(lng)) = row? {
                points.push(GeoPoint { lat, lng });
            }
        }
        Ok(points)
    }

    pub fn review_count(&self) -> Result<u64> {
        self.row_count("reviews")
    }

    /// Review scores of delivered orders with their delivery time in days
    pub fn delivery_reviews(&self) -> Result<Vec<DeliveryReview>> {
        self.require_tables(&["orders", "reviews"])?;
        let mut stmt = self.conn.prepare(
            "SELECT
                r.review_score,
                julianday(o.order_delivered_customer_date) - julianday(o.order_purchase_timestamp)
             FROM orders o
             JOIN reviews r ON o.order_id = r.order_id
             WHERE o.order_status = 'delivered'
               AND o.order_delivered_customer_date IS NOT NULL",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, Option<f64>>(1)?))
        })?;

        let mut pairs = Vec::new();
        for row in rows {
            if let (Some(review_score), Some(delivery_days)) = row? {
                pairs.push(DeliveryReview {
                    review_score,
                    delivery_days,
                });
            }
        }
        Ok(pairs)
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
