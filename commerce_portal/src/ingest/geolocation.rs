//! Geolocation cleaning
//!
//! The raw export carries several coordinates per zip-code prefix and some
//! points far outside the country. Rows are reduced to one averaged point
//! per prefix inside the configured bounding box.

use super::table::{Column, ColumnType, TableData};
use crate::config::GeoBounds;
use crate::{PortalError, Result};
use rusqlite::types::Value;
use std::collections::BTreeMap;

const PREFIX: &str = "geolocation_zip_code_prefix";
const LAT: &str = "geolocation_lat";
const LNG: &str = "geolocation_lng";
const CITY: &str = "geolocation_city";
const STATE: &str = "geolocation_state";

/// Zip-code prefix, numeric prefixes ordered before textual ones
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ZipPrefix {
    Numeric(i64),
    Text(String),
}

impl ZipPrefix {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match raw.parse::<i64>() {
            Ok(n) => ZipPrefix::Numeric(n),
            Err(_) => ZipPrefix::Text(raw.to_string()),
        })
    }

    fn into_value(self) -> Value {
        match self {
            ZipPrefix::Numeric(n) => Value::Integer(n),
            ZipPrefix::Text(s) => Value::Text(s),
        }
    }
}

#[derive(Debug, Default)]
struct PrefixGroup {
    lat_sum: f64,
    lng_sum: f64,
    count: usize,
    city: Option<String>,
    state: Option<String>,
}

impl PrefixGroup {
    fn add(&mut self, lat: f64, lng: f64, city: Option<&str>, state: Option<&str>) {
        self.lat_sum += lat;
        self.lng_sum += lng;
        self.count += 1;
        if self.city.is_none() {
            self.city = city.map(str::to_string);
        }
        if self.state.is_none() {
            self.state = state.map(str::to_string);
        }
    }
}

/// Clean raw geolocation records into one row per zip-code prefix
pub fn clean(headers: &[String], records: &[Vec<String>], bounds: &GeoBounds) -> Result<TableData> {
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let missing = |name: &str| PortalError::InvalidSource(format!("Geolocation export has no '{name}' column"));

    let prefix_idx = position(PREFIX).ok_or_else(|| missing(PREFIX))?;
    let lat_idx = position(LAT).ok_or_else(|| missing(LAT))?;
    let lng_idx = position(LNG).ok_or_else(|| missing(LNG))?;
    let city_idx = position(CITY);
    let state_idx = position(STATE);

    let cell = |record: &[String], idx: usize| -> Option<String> {
        record
            .get(idx)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    };

    let mut groups: BTreeMap<ZipPrefix, PrefixGroup> = BTreeMap::new();
    for record in records {
        let Some(prefix) = record.get(prefix_idx).and_then(|raw| ZipPrefix::parse(raw)) else {
            continue;
        };
        let lat = record.get(lat_idx).and_then(|c| c.trim().parse::<f64>().ok());
        let lng = record.get(lng_idx).and_then(|c| c.trim().parse::<f64>().ok());
        let (Some(lat), Some(lng)) = (lat, lng) else {
            continue;
        };
        if !lat.is_finite() || !lng.is_finite() || !bounds.contains(lat, lng) {
            continue;
        }

        let city = city_idx.and_then(|idx| cell(record.as_slice(), idx));
        let state = state_idx.and_then(|idx| cell(record.as_slice(), idx));
        groups
            .entry(prefix)
            .or_default()
            .add(lat, lng, city.as_deref(), state.as_deref());
    }

    let mut columns = vec![
        Column {
            name: PREFIX.to_string(),
            kind: ColumnType::Integer,
        },
        Column {
            name: LAT.to_string(),
            kind: ColumnType::Real,
        },
        Column {
            name: LNG.to_string(),
            kind: ColumnType::Real,
        },
    ];
    if city_idx.is_some() {
        columns.push(Column {
            name: CITY.to_string(),
            kind: ColumnType::Text,
        });
    }
    if state_idx.is_some() {
        columns.push(Column {
            name: STATE.to_string(),
            kind: ColumnType::Text,
        });
    }
    if groups.keys().any(|p| matches!(p, ZipPrefix::Text(_))) {
        columns[0].kind = ColumnType::Text;
    }

    let rows = groups
        .into_iter()
        .map(|(prefix, group)| {
            let n = group.count as f64;
            let mut row = vec![
                prefix.into_value(),
                Value::Real(group.lat_sum / n),
                Value::Real(group.lng_sum / n),
            ];
            if city_idx.is_some() {
                row.push(group.city.map(Value::Text).unwrap_or(Value::Null));
            }
            if state_idx.is_some() {
                row.push(group.state.map(Value::Text).unwrap_or(Value::Null));
            }
            row
        })
        .collect();

    TableData::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        [PREFIX, LAT, LNG, CITY, STATE].iter().map(|s| s.to_string()).collect()
    }

    fn record(prefix: &str, lat: &str, lng: &str, city: &str) -> Vec<String> {
        vec![prefix.into(), lat.into(), lng.into(), city.into(), "SP".into()]
    }

    #[test]
    fn test_groups_by_prefix_with_mean_coordinates() {
        let records = vec![
            record("01037", "-23.0", "-46.0", "sao paulo"),
            record("01037", "-24.0", "-47.0", "são paulo"),
            record("999", "-10.0", "-40.0", "x"),
        ];
        let table = clean(&headers(), &records, &GeoBounds::default()).unwrap();

        assert_eq!(table.len(), 2);
        // Numeric ordering, not lexicographic
        assert_eq!(table.rows()[0][0], Value::Integer(999));
        assert_eq!(table.rows()[1][0], Value::Integer(1037));
        assert_eq!(table.rows()[1][1], Value::Real(-23.5));
        assert_eq!(table.rows()[1][2], Value::Real(-46.5));
        assert_eq!(table.rows()[1][3], Value::Text("sao paulo".into()));
    }

    #[test]
    fn test_drops_out_of_bounds_and_unparseable() {
        let records = vec![
            record("1", "40.7", "-74.0", "new york"),
            record("2", "abc", "-46.0", "nowhere"),
            record("3", "", "-46.0", "nowhere"),
            record("", "-23.0", "-46.0", "no prefix"),
            record("4", "-23.0", "-46.0", "kept"),
        ];
        let table = clean(&headers(), &records, &GeoBounds::default()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][0], Value::Integer(4));
    }

    #[test]
    fn test_missing_coordinate_column() {
        let headers = vec![PREFIX.to_string(), LAT.to_string()];
        let result = clean(&headers, &[], &GeoBounds::default());
        assert!(matches!(result, Err(PortalError::InvalidSource(_))));
    }
}
