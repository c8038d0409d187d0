//! Daily revenue series handling

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Revenue observed on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    /// Calendar day
    pub date: NaiveDate,
    /// Revenue booked on that day
    pub amount: f64,
}

impl DailyRevenue {
    /// Create a new daily observation
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Ordered daily revenue series
///
/// Dates are unique and strictly ascending, amounts are finite and
/// non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSeries {
    points: Vec<DailyRevenue>,
}

impl RevenueSeries {
    /// Build a series from raw rows
    ///
    /// Rows with a non-finite amount are dropped, the remainder is sorted by
    /// date and only the first row of each date is kept. Negative amounts are
    /// rejected.
    pub fn new(rows: Vec<DailyRevenue>) -> Result<Self> {
        let mut points: Vec<DailyRevenue> =
            rows.into_iter().filter(|r| r.amount.is_finite()).collect();

        if let Some(bad) = points.iter().find(|r| r.amount < 0.0) {
            return Err(ForecastError::DataError(format!(
                "Negative revenue {} on {}",
                bad.amount, bad.date
            )));
        }

        // Stable sort keeps the first occurrence of each date in front
        points.sort_by_key(|r| r.date);
        points.dedup_by_key(|r| r.date);

        Ok(Self { points })
    }

    /// Build a series from (date, amount) pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, amount)| DailyRevenue::new(date, amount))
                .collect(),
        )
    }

    /// Build a series of consecutive days starting at `start`
    pub fn from_daily_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        Self::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Duration::days(i as i64), v)),
        )
    }

    /// Observations in date order
    pub fn points(&self) -> &[DailyRevenue] {
        &self.points
    }

    /// Dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Amounts in date order
    pub fn amounts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amount).collect()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of observed days
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// First observed day
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last observed day
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Amount observed on `date`, if any
    pub fn amount_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].amount)
    }

    /// Observations on or after `last_date - days`
    ///
    /// The cutoff is inclusive, so a 90-day window covers 91 calendar days
    /// when every day is present.
    pub fn trailing_window(&self, days: i64) -> Self {
        match self.last_date() {
            Some(last) => {
                let cutoff = last - Duration::days(days);
                Self {
                    points: self
                        .points
                        .iter()
                        .copied()
                        .filter(|p| p.date >= cutoff)
                        .collect(),
                }
            }
            None => Self::default(),
        }
    }

    /// Sum of the last `n` amounts (fewer if the series is shorter)
    pub fn tail_sum(&self, n: usize) -> f64 {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].iter().map(|p| p.amount).sum()
    }
}

/// Loader for revenue series stored as CSV
#[derive(Debug)]
pub struct RevenueLoader;

impl RevenueLoader {
    /// Load a daily revenue series from a CSV file
    ///
    /// The file needs a header with a date column (`ds` or a name containing
    /// "date") and an amount column (`y`, or a name containing "revenue" or
    /// "amount"). Rows with an empty amount are skipped.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<RevenueSeries> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a daily revenue series from any CSV reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<RevenueSeries> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let date_idx = Self::detect_column(&headers, "ds", &["date"]).ok_or_else(|| {
            ForecastError::DataError("No date column found in data".to_string())
        })?;
        let amount_idx = Self::detect_column(&headers, "y", &["revenue", "amount"])
            .ok_or_else(|| {
                ForecastError::DataError("No revenue column found in data".to_string())
            })?;

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            let raw_date = record.get(date_idx).unwrap_or_default().trim();
            let raw_amount = record.get(amount_idx).unwrap_or_default().trim();
            if raw_amount.is_empty() {
                continue;
            }

            // Accept plain dates and the date part of timestamps
            let date = NaiveDate::parse_from_str(raw_date.get(..10).unwrap_or(raw_date), "%Y-%m-%d")
                .map_err(|e| {
                    ForecastError::DataError(format!(
                        "Invalid date '{}' on row {}: {}",
                        raw_date,
                        line + 1,
                        e
                    ))
                })?;
            let amount: f64 = raw_amount.parse().map_err(|e| {
                ForecastError::DataError(format!(
                    "Invalid amount '{}' on row {}: {}",
                    raw_amount,
                    line + 1,
                    e
                ))
            })?;
            rows.push(DailyRevenue::new(date, amount));
        }

        RevenueSeries::new(rows)
    }

    fn detect_column(headers: &csv::StringRecord, exact: &str, fragments: &[&str]) -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(exact))
            .or_else(|| {
                headers.iter().position(|h| {
                    let lower = h.to_lowercase();
                    fragments.iter().any(|f| lower.contains(f))
                })
            })
    }
}
