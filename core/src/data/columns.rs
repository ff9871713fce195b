//! Header lookup and field parsing shared by the CSV loaders.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use super::error::LoadError;

/// Column positions resolved from a CSV header by name.
pub(super) struct ColumnIndex {
    names: Vec<String>,
}

impl ColumnIndex {
    pub fn new(header: &StringRecord) -> Self {
        Self {
            names: header.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
        }
    }

    pub fn optional(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }

    pub fn required(&self, column: &'static str, path: &Path) -> Result<usize, LoadError> {
        self.optional(column).ok_or_else(|| LoadError::MissingColumn {
            path: path.to_path_buf(),
            column,
        })
    }
}

/// Why a single row was rejected.
#[derive(Debug)]
pub(super) struct RowError {
    pub column: &'static str,
    pub value: String,
}

impl RowError {
    fn new(column: &'static str, value: &str) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

pub(super) fn field<'r>(row: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| row.get(i)).map(str::trim).unwrap_or("")
}

/// A count cell. Blank cells count as zero; integral floats (`"12.0"`) are
/// accepted since some exporters write them.
pub(super) fn parse_count(raw: &str, column: &'static str) -> Result<i64, RowError> {
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(RowError::new(column, raw)),
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part.
pub(super) fn parse_date(raw: &str, column: &'static str) -> Result<NaiveDate, RowError> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| RowError::new(column, raw))
}

/// Epoch seconds, RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or a bare date.
pub(super) fn parse_timestamp(raw: &str, column: &'static str) -> Result<i64, RowError> {
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| RowError::new(column, raw))
}
