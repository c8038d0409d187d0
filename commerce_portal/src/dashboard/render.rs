//! Plain-text rendering of a dashboard report

use super::experience::DELIVERY_WINDOWS;
use super::{
    DashboardReport, ExperiencePanel, ForecastPanel, HealthPanel, KpiPanel, LogisticsPanel,
    PanelOutcome,
};
use std::fmt::{self, Display, Formatter, Write};

/// Format a currency amount as `$1,234.56`
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Format an integer with thousands separators
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "N/A".to_string(), |r| format!("{r:.2} / 5.0"))
}

fn section<T>(
    f: &mut Formatter<'_>,
    title: &str,
    outcome: &PanelOutcome<T>,
    body: impl FnOnce(&mut Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    writeln!(f, "== {title} ==")?;
    match outcome {
        PanelOutcome::Ready(panel) => body(f, panel)?,
        PanelOutcome::NoData(message) => writeln!(f, "No data: {message}")?,
        PanelOutcome::TableMissing(table) => writeln!(f, "Table missing: {table}")?,
        PanelOutcome::Failed(message) => writeln!(f, "Warning: {message}")?,
    }
    writeln!(f)
}

fn write_kpis(f: &mut Formatter<'_>, kpi: &KpiPanel) -> fmt::Result {
    writeln!(f, "Total Revenue:  {}", format_currency(kpi.total_revenue))?;
    match kpi.avg_delivery_days {
        Some(days) => writeln!(f, "Avg Delivery:   {days:.1} Days")?,
        None => writeln!(f, "Avg Delivery:   N/A")?,
    }
    match kpi.avg_review_score {
        Some(score) => writeln!(f, "Customer Score: {score:.2}")?,
        None => writeln!(f, "Customer Score: N/A")?,
    }
    writeln!(f, "Total Orders:   {}", format_count(kpi.total_orders))
}

fn write_forecast(f: &mut Formatter<'_>, panel: &ForecastPanel) -> fmt::Result {
    let report = &panel.report;
    let metrics = &report.metrics;
    let trend = metrics
        .forecast_trend_pct
        .map_or_else(|| "N/A".to_string(), |pct| format!("{pct:+.1}%"));

    writeln!(f, "Model: {} over {} observed days", report.model_name, panel.observed_days)?;
    writeln!(f, "Current 7d Revenue: {}", format_currency(metrics.current_7d_revenue))?;
    writeln!(f, "Forecast Trend:     {trend}")?;
    writeln!(f, "Shocks Detected:    {}", metrics.anomaly_count)?;
    match report.baseline.value() {
        Some(value) => writeln!(
            f,
            "Baseline ({}d):      {}",
            report.baseline.window(),
            format_currency(value)
        )?,
        None => writeln!(f, "Baseline ({}d):      N/A", report.baseline.window())?,
    }

    if let Some(cp) = &report.dominant_changepoint {
        writeln!(f, "Dominant changepoint: {} (shift {:+.3})", cp.date, cp.delta)?;
    }
    if !report.changepoints.is_empty() {
        let dates = report
            .changepoints
            .iter()
            .map(|cp| cp.date.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "Significant changepoints: {dates}")?;
    }

    let display = report.reconciliation.display();
    if !display.is_empty() {
        writeln!(f, "{:<12} {:>14} {:>14} {:>14}", "Date", "Forecast", "Lower", "Upper")?;
        for point in display {
            writeln!(
                f,
                "{:<12} {:>14.2} {:>14.2} {:>14.2}",
                point.date.to_string(),
                point.yhat,
                point.yhat_lower,
                point.yhat_upper
            )?;
        }
    }

    for anomaly in &report.anomalies {
        writeln!(
            f,
            "Shock on {}: observed {}, expected {} (score {:.1})",
            anomaly.date,
            format_currency(anomaly.observed),
            format_currency(anomaly.predicted),
            anomaly.score
        )?;
    }

    let range = &report.display_range;
    writeln!(
        f,
        "View: {} to {}, 0 to {}",
        range.x_start,
        range.x_end,
        format_currency(range.y_max)
    )
}

fn write_logistics(f: &mut Formatter<'_>, panel: &LogisticsPanel) -> fmt::Result {
    writeln!(
        f,
        "Map centre ({:.2}, {:.2}), zoom {}",
        panel.view.center_lat, panel.view.center_lng, panel.view.zoom
    )?;
    writeln!(
        f,
        "{} customer locations in {} occupied cells ({} outside the map)",
        format_count(panel.point_count as u64),
        panel.grid.cells.len(),
        panel.grid.outside
    )?;
    if let Some(cell) = panel.grid.hottest() {
        writeln!(
            f,
            "Densest cell around ({:.2}, {:.2}) with {} locations",
            cell.lat,
            cell.lng,
            format_count(cell.count as u64)
        )?;
    }
    Ok(())
}

fn write_experience(f: &mut Formatter<'_>, panel: &ExperiencePanel) -> fmt::Result {
    writeln!(f, "{:<14} {:>6} {:>6} {:>6} {:>6} {:>6}", "Window", "1", "2", "3", "4", "5")?;
    for (window, _, _) in DELIVERY_WINDOWS {
        let mut line = format!("{window:<14}");
        for score in 1..=5u8 {
            let count = panel
                .counts
                .iter()
                .find(|c| c.window == window && c.score == score)
                .map_or(0, |c| c.count);
            write!(line, " {count:>6}")?;
        }
        writeln!(f, "{line}")?;
    }
    if let Some(note) = &panel.goal_note {
        writeln!(f, "{note}")?;
    }

    writeln!(f, "Fast Delivery Rating: {}", format_rating(panel.fast_rating))?;
    match panel.late_gap {
        Some(gap) => writeln!(
            f,
            "Late Delivery Rating: {} ({gap:+.2} vs ideal)",
            format_rating(panel.late_rating)
        )?,
        None => writeln!(f, "Late Delivery Rating: N/A")?,
    }
    writeln!(f, "Insight: {}", panel.insight)
}

fn write_health(f: &mut Formatter<'_>, panel: &HealthPanel) -> fmt::Result {
    writeln!(f, "{:<14} {:>10}  Status", "Table", "Rows")?;
    for table in &panel.tables {
        writeln!(
            f,
            "{:<14} {:>10}  {}",
            table.table,
            format_count(table.rows()),
            table.status
        )?;
    }
    if panel.has_gap() {
        writeln!(f, "Critical data gap detected. These tables have no rows:")?;
        for (table, role) in &panel.critical_gaps {
            writeln!(f, "  * {table}: {role}")?;
        }
        writeln!(f, "Re-run the ingestion and check the source exports for these tables.")?;
    }
    Ok(())
}

impl Display for DashboardReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        section(f, "Key Metrics", &self.kpis, write_kpis)?;
        section(f, "Revenue Forecast", &self.forecast, write_forecast)?;
        section(f, "Customer Density", &self.logistics, write_logistics)?;
        section(f, "Delivery Experience", &self.experience, write_experience)?;
        section(f, "Pipeline Health", &self.health, write_health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-1500.0), "-$1,500.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(96478), "96,478");
    }
}
