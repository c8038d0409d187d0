//! Pipeline health check

use crate::store::{Store, TableStatus, MONITORED_TABLES};
use crate::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableHealth {
    pub table: String,
    pub status: TableStatus,
}

impl TableHealth {
    pub fn rows(&self) -> u64 {
        self.status.row_count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthPanel {
    pub tables: Vec<TableHealth>,
    /// Tables with no rows, each with what it feeds
    pub critical_gaps: Vec<(String, &'static str)>,
}

impl HealthPanel {
    pub fn has_gap(&self) -> bool {
        !self.critical_gaps.is_empty()
    }
}

/// What breaks when a monitored table is empty
pub fn table_role(table: &str) -> &'static str {
    match table {
        "orders" => "Required for revenue, delivery and experience metrics.",
        "order_items" => "Required for revenue and price calculations.",
        "customers" => "Required for geographic mapping.",
        "geolocation" => "Required for the customer density heatmap.",
        "reviews" => "Required for the delivery experience panel.",
        _ => "Required by the dashboard.",
    }
}

pub fn build(store: &Store) -> Result<HealthPanel> {
    let tables = MONITORED_TABLES
        .iter()
        .map(|table| {
            Ok(TableHealth {
                table: table.to_string(),
                status: store.table_status(table)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let critical_gaps = tables
        .iter()
        .filter(|t| t.rows() == 0)
        .map(|t| (t.table.clone(), table_role(&t.table)))
        .collect();

    Ok(HealthPanel {
        tables,
        critical_gaps,
    })
}
