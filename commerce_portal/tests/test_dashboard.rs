use chrono::{Duration, NaiveDate};
use commerce_portal::dashboard::PanelOutcome;
use commerce_portal::{Dashboard, GeoBounds, Ingestor, PortalConfig, PortalError, Store, TableStatus};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Delivery time in days for the order placed on day `i`
fn delivery_days(i: usize) -> i64 {
    (i % 25) as i64 + 1
}

fn review_score(days: i64) -> u8 {
    match days {
        d if d <= 7 => 5,
        d if d <= 14 => 4,
        d if d <= 21 => 3,
        _ => 2,
    }
}

/// Write a dataset with one delivered order per day, revenue stepping from
/// 100 to 200 on day 60, plus a cancelled order every tenth day.
fn write_dataset(dir: &Path, days: usize, with_reviews: bool) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut orders = String::from(
        "order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date\n",
    );
    let mut items = String::from("order_id,order_item_id,price\n");
    let mut customers = String::from("customer_id,customer_zip_code_prefix,customer_state\n");
    let mut reviews = String::from("review_id,order_id,review_score\n");

    for i in 0..days {
        let purchased = start + Duration::days(i as i64);
        let delivered = purchased + Duration::days(delivery_days(i));
        let price = if i < 60 { 100.0 } else { 200.0 };
        writeln!(orders, "o{i},c{i},delivered,{purchased} 10:00:00,{delivered} 08:00:00").unwrap();
        writeln!(items, "o{i},1,{price:.2}").unwrap();
        writeln!(customers, "c{i},01037,SP").unwrap();
        writeln!(reviews, "r{i},o{i},{}", review_score(delivery_days(i))).unwrap();

        if i % 10 == 0 {
            writeln!(orders, "x{i},c{i},canceled,{purchased} 12:00:00,").unwrap();
            writeln!(items, "x{i},1,999.00").unwrap();
        }
    }

    fs::write(dir.join("olist_orders_dataset.csv"), orders).unwrap();
    fs::write(dir.join("olist_order_items_dataset.csv"), items).unwrap();
    fs::write(dir.join("olist_customers_dataset.csv"), customers).unwrap();
    fs::write(
        dir.join("olist_order_reviews_dataset.csv"),
        if with_reviews { reviews } else { "review_id,order_id,review_score\n".to_string() },
    )
    .unwrap();
    fs::write(
        dir.join("olist_geolocation_dataset.csv"),
        "geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state\n\
         01037,-23.55,-46.63,sao paulo,SP\n\
         20000,-22.90,-43.20,rio de janeiro,RJ\n",
    )
    .unwrap();
}

fn build_store(days: usize, with_reviews: bool) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    write_dataset(dir.path(), days, with_reviews);
    let db = dir.path().join("database").join("ecommerce.db");
    let mut store = Store::create(&db).unwrap();
    Ingestor::new(dir.path(), GeoBounds::default())
        .run(&mut store)
        .unwrap();
    (dir, db)
}

#[test]
fn test_unreachable_store() {
    let dir = tempdir().unwrap();
    let result = Store::open_read_only(dir.path().join("missing.db"));
    assert!(matches!(result, Err(PortalError::StoreUnreachable { .. })));
}

#[test]
fn test_full_dashboard() {
    let (_dir, db) = build_store(120, true);
    let store = Store::open_read_only(&db).unwrap();
    let config = PortalConfig::default();
    let report = Dashboard::new(&store, &config).render();

    let kpis = report.kpis.ready().unwrap();
    assert!((kpis.total_revenue - 18_000.0).abs() < 1e-6);
    assert_eq!(kpis.total_orders, 120);
    let score = kpis.avg_review_score.unwrap();
    assert!(score > 2.0 && score < 5.0);
    assert!(kpis.avg_delivery_days.is_some());

    let forecast = report.forecast.ready().unwrap();
    assert_eq!(forecast.observed_days, 120);
    assert!((forecast.report.metrics.current_7d_revenue - 1400.0).abs() < 1e-6);
    assert_eq!(forecast.report.reconciliation.future().len(), 30);
    let trend = forecast.report.metrics.forecast_trend_pct.unwrap();
    assert!(trend.abs() < 10.0, "trend {trend}");
    assert_eq!(forecast.report.baseline.value(), Some(200.0));

    let logistics = report.logistics.ready().unwrap();
    assert_eq!(logistics.point_count, 2);
    assert_eq!(logistics.grid.total(), 2);

    let experience = report.experience.ready().unwrap();
    assert_eq!(experience.sample_size, 120);
    assert_eq!(experience.counts.iter().map(|c| c.count).sum::<usize>(), 120);
    assert!(experience.goal_note.is_none());
    assert_eq!(experience.fast_rating, Some(5.0));
    assert_eq!(experience.late_rating, Some(2.0));
    assert_eq!(experience.late_gap, Some(-3.0));

    let health = report.health.ready().unwrap();
    assert!(!health.has_gap());
    assert!(health.tables.iter().all(|t| t.status.is_online()));
}

#[test]
fn test_empty_reviews_only_affect_their_panels() {
    let (_dir, db) = build_store(120, false);
    let store = Store::open_read_only(&db).unwrap();
    let config = PortalConfig::default();
    let report = Dashboard::new(&store, &config).render();

    assert!(matches!(&report.experience, PanelOutcome::NoData(msg) if msg.contains("reviews")));
    assert!(report.forecast.is_ready());
    assert!(report.logistics.is_ready());
    // No reviews leaves the average score absent
    assert_eq!(report.kpis.ready().unwrap().avg_review_score, None);

    let health = report.health.ready().unwrap();
    let reviews = health.tables.iter().find(|t| t.table == "reviews").unwrap();
    assert_eq!(reviews.status, TableStatus::Empty);
    let gaps: Vec<&str> = health.critical_gaps.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(gaps, vec!["reviews"]);
}

#[test]
fn test_single_day_history_fails_forecast_only() {
    let (_dir, db) = build_store(1, true);
    let store = Store::open_read_only(&db).unwrap();
    let config = PortalConfig::default();
    let report = Dashboard::new(&store, &config).render();

    match &report.forecast {
        PanelOutcome::Failed(msg) => assert!(msg.contains("Insufficient"), "{msg}"),
        other => panic!("expected failed forecast, got {other:?}"),
    }
    assert!(report.kpis.is_ready());
    assert!(report.experience.is_ready());
}

#[test]
fn test_empty_store_reports_missing_tables() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("empty.db");
    drop(Store::create(&db).unwrap());

    let store = Store::open_read_only(&db).unwrap();
    let config = PortalConfig::default();
    let report = Dashboard::new(&store, &config).render();

    assert_eq!(report.kpis, PanelOutcome::TableMissing("orders".to_string()));
    assert_eq!(report.forecast, PanelOutcome::TableMissing("orders".to_string()));
    assert_eq!(report.logistics, PanelOutcome::TableMissing("geolocation".to_string()));
    assert_eq!(report.experience, PanelOutcome::TableMissing("reviews".to_string()));
    assert!(report.to_string().contains("Table missing: geolocation"));

    let health = report.health.ready().unwrap();
    assert!(health.tables.iter().all(|t| t.status == TableStatus::Missing));
    assert_eq!(health.critical_gaps.len(), 5);
}

#[test]
fn test_text_and_json_output() {
    let (_dir, db) = build_store(120, false);
    let store = Store::open_read_only(&db).unwrap();
    let config = PortalConfig::default();
    let report = Dashboard::new(&store, &config).render();

    let text = report.to_string();
    assert!(text.contains("== Key Metrics =="));
    assert!(text.contains("Total Revenue:  $18,000.00"));
    assert!(text.contains("Customer Score: N/A"));
    assert!(text.contains("== Pipeline Health =="));
    assert!(text.contains("Critical data gap detected"));
    assert!(text.contains("No data: The reviews table is empty"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["forecast"]["status"], "ready");
    assert_eq!(json["experience"]["status"], "no_data");
    assert_eq!(json["kpis"]["panel"]["total_orders"], 120);
}
