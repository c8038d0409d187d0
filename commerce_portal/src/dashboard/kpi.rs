//! Headline KPI row

use crate::store::Store;
use crate::{PortalError, Result};
use serde::Serialize;

/// Totals over delivered orders
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KpiPanel {
    pub total_revenue: f64,
    /// `None` when no delivered order has a delivery date
    pub avg_delivery_days: Option<f64>,
    /// `None` when there are no reviews
    pub avg_review_score: Option<f64>,
    pub total_orders: u64,
}

pub fn build(store: &Store) -> Result<KpiPanel> {
    let summary = store.kpi_summary()?;
    if summary.total_orders == 0 {
        return Err(PortalError::EmptyResult(
            "No delivered orders recorded yet.".to_string(),
        ));
    }

    Ok(KpiPanel {
        total_revenue: summary.total_revenue.unwrap_or(0.0),
        avg_delivery_days: summary.avg_delivery_days,
        avg_review_score: summary.avg_review_score,
        total_orders: summary.total_orders,
    })
}
