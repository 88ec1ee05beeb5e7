//! Tests for event table validation

mod common;

use chatflow_core::schema::{TIMESTAMP_DTYPE, REQUIRED_COLUMNS};
use chatflow_core::{verify, verify_format, EventTableExt, Error, SchemaError};
use common::*;
use polars::prelude::*;

#[test]
fn test_verify_normalizes_timestamps() {
    let table = sample_log();
    let validated = verify_format(&table).unwrap();

    assert_eq!(validated.height(), table.height());
    assert_eq!(
        validated.column("START_TIMESTAMP").unwrap().dtype(),
        &TIMESTAMP_DTYPE
    );
    assert_eq!(
        validated.column("END_TIMESTAMP").unwrap().dtype(),
        &TIMESTAMP_DTYPE
    );

    let ends = validated.timestamp_values("END_TIMESTAMP").unwrap();
    assert!(ends[0].is_some());
    assert!(ends[2].is_none());
}

#[test]
fn test_verify_leaves_input_untouched() {
    let table = sample_log();
    let _ = verify_format(&table).unwrap();
    assert_eq!(
        table.column("START_TIMESTAMP").unwrap().dtype(),
        &DataType::String
    );
}

#[test]
fn test_verify_reports_every_missing_column() {
    let table = df!["ACTIVITY" => ["a"], "AGENTE" => ["ai"]].unwrap();
    let err = verify(&table, &REQUIRED_COLUMNS).unwrap_err();

    match err {
        Error::Schema(SchemaError::MissingColumns { columns }) => {
            assert_eq!(columns, ["CASE_ID", "END_TIMESTAMP", "START_TIMESTAMP"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_verify_rejects_unparsable_timestamp() {
    let table = event_table(&[
        ("c1", "a", "2024-03-01 09:00:00", None, "ai"),
        ("c1", "b", "half past nine", None, "ai"),
    ]);
    let err = verify_format(&table).unwrap_err();

    match err {
        Error::Schema(SchemaError::Format { column, value }) => {
            assert_eq!(column, "START_TIMESTAMP");
            assert_eq!(value, "half past nine");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_verify_rejects_numeric_timestamp_column() {
    let table = df![
        "CASE_ID" => ["c1"],
        "ACTIVITY" => ["a"],
        "START_TIMESTAMP" => [1i64],
        "END_TIMESTAMP" => [2i64],
    ]
    .unwrap();
    let err = verify_format(&table).unwrap_err();
    assert!(matches!(err, Error::Schema(SchemaError::Format { .. })));
}

#[test]
fn test_verify_is_idempotent() {
    let once = verify_format(&sample_log()).unwrap();
    let twice = verify_format(&once).unwrap();
    assert!(once.equals_missing(&twice));
    assert_eq!(once.fingerprint().unwrap(), twice.fingerprint().unwrap());
}

#[test]
fn test_custom_required_columns() {
    let table = df!["CASE_ID" => ["c1"], "ACTIVITY" => ["a"]].unwrap();
    let validated = verify(&table, &["CASE_ID", "ACTIVITY"]).unwrap();
    assert_eq!(validated.width(), 2);
}
