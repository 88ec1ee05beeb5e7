//! Pre-processing steps run before an aggregation
//!
//! An aux op is a pure table-to-table transformation. Its [`key`](AuxOp::key)
//! identifies the transformation (including its parameters) so that the
//! result can be shared between aggregators through an
//! [`AuxCache`](crate::AuxCache).

use std::collections::HashMap;
use std::fmt;

use chatflow_core::schema::{datetime_column, COLUMN_CASE_ID, COLUMN_END_TS, COLUMN_START_TS};
use chatflow_core::{EventTableExt, Result};
use polars::prelude::*;

/// Default column written by [`DeriveCaseStartDate`]
pub const DEFAULT_CASE_DATE_COLUMN: &str = "CASE_DATE";
/// Default column written by [`DeriveDurations`]
pub const DEFAULT_DURATION_COLUMN: &str = "DURATION_SECONDS";

const MICROS_PER_DAY: i64 = 86_400_000_000;
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// A pure pre-processing step
pub trait AuxOp: fmt::Debug + Send + Sync {
    /// Identity of this step and its parameters, used as a cache key
    fn key(&self) -> String;

    /// Columns the step reads
    fn required_columns(&self) -> Vec<&'static str>;

    /// Return the transformed copy of `table`
    fn apply(&self, table: &DataFrame) -> Result<DataFrame>;
}

/// Normalizes both timestamp columns and fills a missing end with the start.
///
/// When the end column is absent it is created as a copy of the start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeTimestamps;

impl AuxOp for NormalizeTimestamps {
    fn key(&self) -> String {
        "normalize_timestamps".to_string()
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_START_TS]
    }

    fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        table.require_columns(&[COLUMN_START_TS])?;
        let starts = table.timestamp_values(COLUMN_START_TS)?;
        let ends = if table.has_column(COLUMN_END_TS) {
            table.timestamp_values(COLUMN_END_TS)?
        } else {
            vec![None; starts.len()]
        };
        let filled: Vec<Option<i64>> = ends
            .into_iter()
            .zip(&starts)
            .map(|(end, start)| end.or(*start))
            .collect();

        let mut out = table.clone();
        out.with_column(datetime_column(COLUMN_START_TS, starts))?;
        out.with_column(datetime_column(COLUMN_END_TS, filled))?;
        Ok(out)
    }
}

/// Earliest start timestamp per case, keyed by case id
fn case_first_starts(table: &DataFrame) -> Result<(Vec<Option<String>>, HashMap<String, i64>)> {
    let cases = table.string_values(COLUMN_CASE_ID)?;
    let starts = table.timestamp_values(COLUMN_START_TS)?;
    let mut first: HashMap<String, i64> = HashMap::new();
    for (case, start) in cases.iter().zip(&starts) {
        if let (Some(case), Some(start)) = (case, start) {
            first
                .entry(case.clone())
                .and_modify(|current| *current = (*current).min(*start))
                .or_insert(*start);
        }
    }
    Ok((cases, first))
}

/// Adds a date column holding the day each event's case started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeriveCaseStartDate {
    target: String,
}

impl DeriveCaseStartDate {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for DeriveCaseStartDate {
    fn default() -> Self {
        Self::new(DEFAULT_CASE_DATE_COLUMN)
    }
}

impl AuxOp for DeriveCaseStartDate {
    fn key(&self) -> String {
        format!("derive_case_start_date:{}", self.target)
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_START_TS]
    }

    fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        table.require_columns(&[COLUMN_CASE_ID, COLUMN_START_TS])?;
        let (cases, first) = case_first_starts(table)?;
        let days: Int32Chunked = cases
            .iter()
            .map(|case| {
                case.as_ref()
                    .and_then(|case| first.get(case))
                    .map(|micros| micros.div_euclid(MICROS_PER_DAY) as i32)
            })
            .collect();
        let dates = days.with_name(self.target.as_str().into()).into_date();

        let mut out = table.clone();
        out.with_column(Column::from(dates.into_series()))?;
        Ok(out)
    }
}

/// Adds a per-event duration in seconds (end, defaulting to start, minus start)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeriveDurations {
    target: String,
}

impl DeriveDurations {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for DeriveDurations {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_COLUMN)
    }
}

impl AuxOp for DeriveDurations {
    fn key(&self) -> String {
        format!("derive_durations:{}", self.target)
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_START_TS]
    }

    fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        table.require_columns(&[COLUMN_START_TS])?;
        let starts = table.timestamp_values(COLUMN_START_TS)?;
        let ends = if table.has_column(COLUMN_END_TS) {
            table.timestamp_values(COLUMN_END_TS)?
        } else {
            vec![None; starts.len()]
        };
        let seconds: Float64Chunked = starts
            .into_iter()
            .zip(ends)
            .map(|(start, end)| {
                start.map(|start| (end.unwrap_or(start) - start) as f64 / MICROS_PER_SECOND)
            })
            .collect();

        let mut out = table.clone();
        out.with_column(Column::from(
            seconds.with_name(self.target.as_str().into()).into_series(),
        ))?;
        Ok(out)
    }
}
