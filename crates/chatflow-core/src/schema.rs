//! Column schema and validation for event tables
//!
//! Every table entering the system passes through [`verify`] first: it
//! checks the required columns and normalizes both timestamp columns to
//! `Datetime(Microseconds)` so filters and models can compare them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{debug, instrument};

use crate::{Error, Result};

/// Case identifier column
pub const COLUMN_CASE_ID: &str = "CASE_ID";
/// Activity name column
pub const COLUMN_ACTIVITY: &str = "ACTIVITY";
/// Event start timestamp column
pub const COLUMN_START_TS: &str = "START_TIMESTAMP";
/// Event end timestamp column (nullable, defaults to start)
pub const COLUMN_END_TS: &str = "END_TIMESTAMP";
/// Actor kind column ("ai", "human" or "syst")
pub const COLUMN_AGENT: &str = "AGENTE";
/// Optional per-case event sequence number
pub const COLUMN_EVENT_ID: &str = "EVENT_ID";

/// Columns every event table must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COLUMN_CASE_ID,
    COLUMN_ACTIVITY,
    COLUMN_START_TS,
    COLUMN_END_TS,
];

/// Columns always read as text, so ids like "007" keep their leading zeros
pub const IDENTIFIER_COLUMNS: [&str; 3] = [COLUMN_CASE_ID, COLUMN_ACTIVITY, COLUMN_AGENT];

/// Columns normalized to a temporal type during validation
pub const TIMESTAMP_COLUMNS: [&str; 2] = [COLUMN_START_TS, COLUMN_END_TS];

/// Physical type every timestamp column is normalized to
pub const TIMESTAMP_DTYPE: DataType = DataType::Datetime(TimeUnit::Microseconds, None);

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Validate `table` against `required_columns` and normalize its timestamps.
///
/// Returns a new frame; the input is left untouched.
///
/// # Errors
/// * [`SchemaError::MissingColumns`](crate::SchemaError::MissingColumns) naming
///   every absent column
/// * [`SchemaError::Format`](crate::SchemaError::Format) when a timestamp
///   value cannot be parsed or the column has a non-temporal type
#[instrument(skip(table), fields(rows = table.height()))]
pub fn verify(table: &DataFrame, required_columns: &[&str]) -> Result<DataFrame> {
    let mut missing: Vec<String> = required_columns
        .iter()
        .filter(|name| table.column(name).is_err())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(Error::missing_columns(missing));
    }

    let mut validated = table.clone();
    for name in TIMESTAMP_COLUMNS {
        if let Ok(column) = table.column(name) {
            let normalized = normalize_timestamps(column)?;
            validated.with_column(normalized)?;
        }
    }

    debug!(columns = validated.width(), "event table validated");
    Ok(validated)
}

/// [`verify`] with the default [`REQUIRED_COLUMNS`]
pub fn verify_format(table: &DataFrame) -> Result<DataFrame> {
    verify(table, &REQUIRED_COLUMNS)
}

/// Convert a column to `Datetime(Microseconds)`.
///
/// String cells are parsed; empty strings and nulls stay null. Datetime and
/// date columns are cast.
pub fn normalize_timestamps(column: &Column) -> Result<Column> {
    let name = column.name().clone();
    match column.dtype() {
        DataType::String => {
            let ca = column.str()?;
            let mut micros = Vec::with_capacity(ca.len());
            for value in ca.into_iter() {
                let parsed = match value.map(str::trim) {
                    None | Some("") => None,
                    Some(raw) => Some(
                        parse_timestamp(raw).ok_or_else(|| Error::format(name.as_str(), raw))?,
                    ),
                };
                micros.push(parsed);
            }
            Ok(datetime_column(name.as_str(), micros))
        }
        DataType::Datetime(_, _) | DataType::Date | DataType::Null => {
            Ok(column.cast(&TIMESTAMP_DTYPE)?)
        }
        other => Err(Error::format(
            name.as_str(),
            format!("expected a timestamp column, got {other:?}"),
        )),
    }
}

/// Build a `Datetime(Microseconds)` column from epoch microseconds
pub fn datetime_column<I>(name: &str, micros: I) -> Column
where
    I: IntoIterator<Item = Option<i64>>,
{
    let physical: Int64Chunked = micros.into_iter().collect();
    let datetime = physical
        .with_name(name.into())
        .into_datetime(TimeUnit::Microseconds, None);
    Column::from(datetime.into_series())
}

/// Parse a single timestamp into microseconds since the Unix epoch (UTC).
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_micros());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.timestamp_micros());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_micros())
}

/// Convert microseconds since the epoch back to a naive UTC datetime
pub fn micros_to_datetime(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        let base = parse_timestamp("2021-01-01 10:00:00").unwrap();
        assert_eq!(parse_timestamp("2021-01-01T10:00:00"), Some(base));
        assert_eq!(parse_timestamp("2021-01-01T10:00:00Z"), Some(base));
        assert_eq!(parse_timestamp("2021-01-01T10:00:00+0000"), Some(base));
        assert_eq!(parse_timestamp("2021-01-01 10:00"), Some(base));
        assert_eq!(
            parse_timestamp("2021-01-01 10:00:00.5"),
            Some(base + 500_000)
        );
        assert_eq!(
            parse_timestamp("2021-01-01"),
            Some(base - 10 * 3_600 * 1_000_000)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_micros_round_trip() {
        let micros = parse_timestamp("2025-07-11 04:53:10.509884").unwrap();
        let dt = micros_to_datetime(micros).unwrap();
        assert_eq!(dt.to_string(), "2025-07-11 04:53:10.509884");
    }
}
