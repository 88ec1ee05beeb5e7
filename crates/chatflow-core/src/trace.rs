//! Per-case event sequences extracted from an event table
//!
//! A trace is the list of events of one case ordered by start timestamp,
//! ties (and null starts, which go last) resolved by original row order.

use std::collections::HashMap;

use polars::prelude::*;

use crate::schema::{COLUMN_ACTIVITY, COLUMN_AGENT, COLUMN_CASE_ID, COLUMN_END_TS, COLUMN_START_TS};
use crate::{EventTableExt, Result};

/// One event of a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Row position in the table the trace was built from
    pub row: usize,
    pub activity: String,
    /// Start timestamp in microseconds
    pub start: Option<i64>,
    /// End timestamp in microseconds, as stored (may be null)
    pub end: Option<i64>,
    pub agent: Option<String>,
}

impl TraceEvent {
    /// End timestamp, falling back to the start when missing
    pub fn end_or_start(&self) -> Option<i64> {
        self.end.or(self.start)
    }
}

/// Ordered events of a single case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseTrace {
    pub case_id: String,
    pub events: Vec<TraceEvent>,
}

impl CaseTrace {
    /// Activity names in trace order
    pub fn activities(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|event| event.activity.as_str())
    }

    /// Rows of the source table belonging to this case
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.events.iter().map(|event| event.row)
    }

    /// Earliest start timestamp of the case
    pub fn first_start(&self) -> Option<i64> {
        self.events.iter().filter_map(|event| event.start).min()
    }

    /// Latest end timestamp (end defaulting to start) of the case
    pub fn last_end(&self) -> Option<i64> {
        self.events.iter().filter_map(TraceEvent::end_or_start).max()
    }
}

/// Group a table into ordered case traces.
///
/// Requires the case id, activity and start timestamp columns; end timestamp
/// and actor columns are read when present. Rows with a null case id or
/// activity are left out. Cases appear in order of first occurrence.
pub fn case_traces(table: &DataFrame) -> Result<Vec<CaseTrace>> {
    table.require_columns(&[COLUMN_CASE_ID, COLUMN_ACTIVITY, COLUMN_START_TS])?;

    let case_ids = table.string_values(COLUMN_CASE_ID)?;
    let activities = table.string_values(COLUMN_ACTIVITY)?;
    let starts = table.timestamp_values(COLUMN_START_TS)?;
    let ends = if table.has_column(COLUMN_END_TS) {
        table.timestamp_values(COLUMN_END_TS)?
    } else {
        vec![None; table.height()]
    };
    let agents = if table.has_column(COLUMN_AGENT) {
        table.string_values(COLUMN_AGENT)?
    } else {
        vec![None; table.height()]
    };

    let mut traces: Vec<CaseTrace> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let rows = case_ids
        .into_iter()
        .zip(activities)
        .zip(starts.into_iter().zip(ends))
        .zip(agents)
        .enumerate();
    for (row, (((case_id, activity), (start, end)), agent)) in rows {
        let (Some(case_id), Some(activity)) = (case_id, activity) else {
            continue;
        };
        let event = TraceEvent {
            row,
            activity,
            start,
            end,
            agent,
        };
        match index.get(&case_id) {
            Some(&position) => traces[position].events.push(event),
            None => {
                index.insert(case_id.clone(), traces.len());
                traces.push(CaseTrace {
                    case_id,
                    events: vec![event],
                });
            }
        }
    }

    for trace in &mut traces {
        // stable: equal starts keep row order
        trace
            .events
            .sort_by_key(|event| (event.start.is_none(), event.start));
    }

    Ok(traces)
}
