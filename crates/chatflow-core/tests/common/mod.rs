//! Common test utilities for chatflow-core tests

use polars::prelude::*;

/// One raw event: case, activity, start, end (may be empty), agent
pub type RawEvent<'a> = (&'a str, &'a str, &'a str, Option<&'a str>, &'a str);

/// Build an unvalidated event table with string timestamps
pub fn event_table(events: &[RawEvent<'_>]) -> DataFrame {
    let cases: Vec<&str> = events.iter().map(|e| e.0).collect();
    let activities: Vec<&str> = events.iter().map(|e| e.1).collect();
    let starts: Vec<&str> = events.iter().map(|e| e.2).collect();
    let ends: Vec<Option<&str>> = events.iter().map(|e| e.3).collect();
    let agents: Vec<&str> = events.iter().map(|e| e.4).collect();
    df![
        "CASE_ID" => cases,
        "ACTIVITY" => activities,
        "START_TIMESTAMP" => starts,
        "END_TIMESTAMP" => ends,
        "AGENTE" => agents,
    ]
    .unwrap()
}

/// Two short conversations mixing human, ai and system events
pub fn sample_log() -> DataFrame {
    event_table(&[
        ("c1", "greet", "2024-03-01 09:00:00", Some("2024-03-01 09:00:05"), "human"),
        ("c1", "answer", "2024-03-01 09:00:06", Some("2024-03-01 09:00:20"), "ai"),
        ("c1", "log", "2024-03-01 09:00:21", None, "syst"),
        ("c2", "greet", "2024-03-02 14:30:00", Some("2024-03-02 14:30:02"), "human"),
        ("c2", "answer", "2024-03-02 14:30:03", None, "ai"),
    ])
}
