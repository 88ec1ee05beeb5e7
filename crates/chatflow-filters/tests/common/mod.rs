//! Common test utilities for chatflow-filters tests

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

/// Three conversations with human, ai and system events
pub fn sample_log() -> DataFrame {
    event_table(&[
        ("c1", "greet", "2024-03-01 09:00:00", Some("2024-03-01 09:00:05"), "human"),
        ("c1", "answer", "2024-03-01 09:00:06", Some("2024-03-01 09:00:20"), "ai"),
        ("c1", "log", "2024-03-01 09:00:21", None, "syst"),
        ("c2", "greet", "2024-03-02 14:30:00", Some("2024-03-02 14:30:02"), "Human"),
        ("c2", "handoff", "2024-03-02 14:30:03", None, "syst"),
        ("c2", "answer", "2024-03-02 14:31:00", Some("2024-03-02 14:31:30"), "AI"),
        ("c3", "answer", "2024-03-03 08:00:00", None, "ai"),
        ("c3", "greet", "2024-03-03 08:01:00", None, "human"),
    ])
}

/// Column values as owned strings
pub fn strings(table: &DataFrame, column: &str) -> Vec<String> {
    table
        .column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

/// Mask entries with nulls shown as false
pub fn bools(mask: &BooleanChunked) -> Vec<bool> {
    mask.into_iter().map(|v| v.unwrap_or(false)).collect()
}
