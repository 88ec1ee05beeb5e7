//! Common test utilities for chatflow-aggregations tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chatflow_aggregations::AuxOp;
use chatflow_core::verify_format;
use polars::prelude::*;

/// Validated event table built from (case, activity, start, end, agent) rows
pub fn event_table(events: &[(&str, &str, &str, Option<&str>, &str)]) -> DataFrame {
    let raw = df![
        "CASE_ID" => events.iter().map(|e| e.0).collect::<Vec<_>>(),
        "ACTIVITY" => events.iter().map(|e| e.1).collect::<Vec<_>>(),
        "START_TIMESTAMP" => events.iter().map(|e| e.2).collect::<Vec<_>>(),
        "END_TIMESTAMP" => events.iter().map(|e| e.3).collect::<Vec<_>>(),
        "AGENTE" => events.iter().map(|e| e.4).collect::<Vec<_>>(),
    ]
    .unwrap();
    verify_format(&raw).unwrap()
}

/// Four conversations, two of them following the same path
pub fn sample_log() -> DataFrame {
    event_table(&[
        ("c1", "greet", "2024-03-01 09:00:00", Some("2024-03-01 09:00:05"), "human"),
        ("c1", "answer", "2024-03-01 09:00:06", Some("2024-03-01 09:00:20"), "ai"),
        ("c1", "log", "2024-03-01 09:00:21", None, "syst"),
        ("c2", "greet", "2024-03-02 14:30:00", Some("2024-03-02 14:30:02"), "human"),
        ("c2", "answer", "2024-03-02 14:31:00", Some("2024-03-02 14:32:30"), "ai"),
        ("c3", "greet", "2024-03-03 23:59:00", None, "human"),
        ("c3", "answer", "2024-03-04 00:01:00", Some("2024-03-04 00:02:00"), "ai"),
        ("c3", "log", "2024-03-04 00:02:01", None, "syst"),
        ("c4", "answer", "2024-03-05 10:00:00", None, "ai"),
    ])
}

/// Aux op that passes the table through and counts its applications
#[derive(Debug, Default)]
pub struct CountingOp {
    pub calls: AtomicUsize,
}

impl CountingOp {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuxOp for CountingOp {
    fn key(&self) -> String {
        "counting".to_string()
    }

    fn required_columns(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn apply(&self, table: &DataFrame) -> chatflow_core::Result<DataFrame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(table.clone())
    }
}
