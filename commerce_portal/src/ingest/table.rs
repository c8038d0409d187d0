//! Typed in-memory tables and their SQLite writer

use crate::store::quote_identifier;
use crate::{PortalError, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fmt;

/// Storage class chosen for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Narrowest type every non-empty cell parses as
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kind = ColumnType::Integer;
        for cell in cells.into_iter().map(str::trim).filter(|c| !c.is_empty()) {
            if kind == ColumnType::Integer && cell.parse::<i64>().is_err() {
                kind = ColumnType::Real;
            }
            if kind == ColumnType::Real && cell.parse::<f64>().is_err() {
                return ColumnType::Text;
            }
        }
        kind
    }

    /// Convert one raw cell, empty cells becoming NULL
    pub fn convert(&self, cell: &str) -> Value {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnType::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Null),
            ColumnType::Real => trimmed.parse().map(Value::Real).unwrap_or(Value::Null),
            ColumnType::Text => Value::Text(cell.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Real => write!(f, "REAL"),
            ColumnType::Text => write!(f, "TEXT"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// A table ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl TableData {
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(PortalError::InvalidSource("Table has no columns".to_string()));
        }
        if let Some(pos) = rows.iter().position(|row| row.len() != columns.len()) {
            return Err(PortalError::InvalidSource(format!(
                "Row {} has {} cells, expected {}",
                pos + 1,
                rows[pos].len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from raw string records, inferring each column's type
    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        let columns: Vec<Column> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                kind: ColumnType::infer(
                    records.iter().map(|r| r.get(idx).map(String::as_str).unwrap_or("")),
                ),
                name,
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| col.kind.convert(record.get(idx).map(String::as_str).unwrap_or("")))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Replace `table` in the store with these rows, atomically
    pub fn write(&self, conn: &mut Connection, table: &str) -> Result<usize> {
        let quoted = quote_identifier(table);
        let column_defs = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.kind))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        let tx = conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {quoted}"), [])?;
        tx.execute(&format!("CREATE TABLE {quoted} ({column_defs})"), [])?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))?;
            for row in &self.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(self.rows.len())
    }
}
