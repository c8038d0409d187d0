use chrono::NaiveDate;
use revenue_forecast::data::{RevenueLoader, RevenueSeries};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_revenue_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ds,y").unwrap();
    writeln!(file, "2018-01-02,150.5").unwrap();
    writeln!(file, "2018-01-01,100.0").unwrap();
    writeln!(file, "2018-01-03,").unwrap();
    writeln!(file, "2018-01-04,80.25").unwrap();

    let series = RevenueLoader::from_csv(file.path()).unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(
        series.first_date(),
        Some(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap())
    );
    assert_eq!(series.amounts(), vec![100.0, 150.5, 80.25]);
}

#[test]
fn test_revenue_loader_detects_named_columns() {
    let csv = "order_date,daily_revenue\n2018-03-01 10:15:00,12.0\n2018-03-02 08:00:00,13.0\n";
    let series = RevenueLoader::from_reader(csv.as_bytes()).unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn test_revenue_loader_error_handling() {
    // Test with non-existent file
    assert!(RevenueLoader::from_csv("nonexistent_file.csv").is_err());

    // Missing revenue column
    let csv = "ds,orders\n2018-01-01,3\n";
    assert!(RevenueLoader::from_reader(csv.as_bytes()).is_err());

    // Unparseable amount
    let csv = "ds,y\n2018-01-01,lots\n";
    assert!(RevenueLoader::from_reader(csv.as_bytes()).is_err());
}

#[test]
fn test_series_queries() {
    let start = NaiveDate::from_ymd_opt(2018, 6, 1).unwrap();
    let series = RevenueSeries::from_daily_values(start, &[5.0, 10.0, 15.0]).unwrap();

    assert!(!series.is_empty());
    assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2018, 6, 3));
    assert_eq!(series.amount_on(start), Some(5.0));
    assert_eq!(
        series.amount_on(NaiveDate::from_ymd_opt(2018, 7, 1).unwrap()),
        None
    );
}
