//! Tests for the built-in filters

mod common;

use chatflow_core::{Error, FilterError, SchemaError};
use chatflow_filters::{
    AgentFilter, CaseFilter, CaseHasActivityFilter, DirectlyFollowsFilter, EventuallyFollowsFilter,
    Filter, FilterExt, FilterSpec, TimeWindowFilter, WindowMode,
};
use common::*;
use polars::prelude::*;

#[test]
fn test_agent_filter_with_and_without_syst() {
    let table = sample_log();

    let with_syst = AgentFilter::new("ai", true).unwrap().apply(&table).unwrap();
    assert_eq!(
        strings(&with_syst, "ACTIVITY"),
        ["answer", "log", "handoff", "answer", "answer"]
    );

    let without_syst = AgentFilter::new("AI", false).unwrap().apply(&table).unwrap();
    assert_eq!(strings(&without_syst, "CASE_ID"), ["c1", "c2", "c3"]);

    let human = AgentFilter::new("human", false).unwrap().apply(&table).unwrap();
    assert_eq!(strings(&human, "ACTIVITY"), ["greet", "greet", "greet"]);
}

#[test]
fn test_agent_filter_rejects_unknown_agent() {
    let err = AgentFilter::new("syst", true).unwrap_err();
    assert!(matches!(
        err,
        Error::Filter(FilterError::InvalidValue { .. })
    ));
}

#[test]
fn test_agent_filter_requires_agent_column() {
    let table = sample_log().drop("AGENTE").unwrap();
    let err = AgentFilter::new("ai", true).unwrap().mask(&table).unwrap_err();
    match err {
        Error::Schema(SchemaError::MissingColumns { columns }) => assert_eq!(columns, ["AGENTE"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_time_window_inside_is_default() {
    let table = sample_log();
    // c1 "answer" runs 09:00:06..09:00:20, straddling the upper bound
    let window = TimeWindowFilter::parse(Some("2024-03-01 09:00:00"), Some("2024-03-01 09:00:10"))
        .unwrap();
    assert_eq!(window.mode(), WindowMode::Inside);

    let kept = window.apply(&table).unwrap();
    assert_eq!(strings(&kept, "ACTIVITY"), ["greet"]);

    let touching = window.with_mode(WindowMode::Touches).apply(&table).unwrap();
    assert_eq!(strings(&touching, "ACTIVITY"), ["greet", "answer"]);
}

#[test]
fn test_time_window_open_bounds_and_missing_end() {
    let table = sample_log();
    let from_march_2 = TimeWindowFilter::parse(Some("2024-03-02"), None).unwrap();
    assert_eq!(
        strings(&from_march_2.apply(&table).unwrap(), "CASE_ID"),
        ["c2", "c2", "c2", "c3", "c3"]
    );

    // end column absent: every event is a point at its start
    let no_end = table.drop("END_TIMESTAMP").unwrap();
    let until = TimeWindowFilter::parse(None, Some("2024-03-01 09:00:06")).unwrap();
    assert_eq!(until.apply(&no_end).unwrap().height(), 2);
}

#[test]
fn test_time_window_null_start_dropped_only_when_bounded() {
    let table = df![
        "CASE_ID" => ["c1", "c1"],
        "ACTIVITY" => ["a", "b"],
        "START_TIMESTAMP" => [Some("2024-03-01 09:00:00"), None],
    ]
    .unwrap();
    let unbounded = TimeWindowFilter::new(None, None);
    assert_eq!(bools(&unbounded.mask(&table).unwrap()), [true, true]);

    let bounded = TimeWindowFilter::parse(Some("2024-03-01"), None).unwrap();
    assert_eq!(bools(&bounded.mask(&table).unwrap()), [true, false]);
}

#[test]
fn test_time_window_requires_start_column() {
    let table = df!["CASE_ID" => ["c1"], "ACTIVITY" => ["a"]].unwrap();
    let err = TimeWindowFilter::new(None, None).mask(&table).unwrap_err();
    assert!(err.is_missing_columns());
}

#[test]
fn test_case_filters() {
    let table = sample_log();

    let cases = CaseFilter::new(["c3", "unknown"]).apply(&table).unwrap();
    assert_eq!(strings(&cases, "ACTIVITY"), ["answer", "greet"]);

    let handoffs = CaseHasActivityFilter::new("handoff").apply(&table).unwrap();
    assert_eq!(strings(&handoffs, "CASE_ID"), ["c2", "c2", "c2"]);
}

#[test]
fn test_directly_follows_uses_time_order() {
    let table = sample_log();

    // c2 has a handoff between greet and answer, c3 answers first
    let greet_answer = DirectlyFollowsFilter::new("greet", "answer").apply(&table).unwrap();
    assert_eq!(strings(&greet_answer, "CASE_ID"), ["c1", "c1", "c1"]);

    let answer_greet = DirectlyFollowsFilter::new("answer", "greet").apply(&table).unwrap();
    assert_eq!(strings(&answer_greet, "CASE_ID"), ["c3", "c3"]);
}

#[test]
fn test_eventually_follows() {
    let table = sample_log();
    let kept = EventuallyFollowsFilter::new("greet", "answer").apply(&table).unwrap();
    assert_eq!(
        strings(&kept, "CASE_ID"),
        ["c1", "c1", "c1", "c2", "c2", "c2"]
    );

    let same = EventuallyFollowsFilter::new("greet", "greet").apply(&table).unwrap();
    assert_eq!(same.height(), 0);
}

#[test]
fn test_combinators_on_real_filters() {
    let table = sample_log();
    let not_c1 = CaseFilter::new(["c1"]).not();
    let ai_outside_c1 = AgentFilter::new("ai", false).unwrap().and(not_c1);
    assert_eq!(
        strings(&ai_outside_c1.apply(&table).unwrap(), "CASE_ID"),
        ["c2", "c3"]
    );

    let either = CaseFilter::new(["c1"]).or(CaseFilter::new(["c3"]));
    assert_eq!(either.apply(&table).unwrap().height(), 5);
    assert_eq!(either.required_columns(), ["CASE_ID"]);
}

#[test]
fn test_filter_spec_builds_working_filter() {
    let spec = FilterSpec::from_json(
        r#"{"type": "and", "filters": [
            {"type": "agent", "agent": "human", "include_syst": false},
            {"type": "case", "cases": ["c2"]}
        ]}"#,
    )
    .unwrap();
    let filter = spec.build().unwrap();
    assert_eq!(strings(&filter.apply(&sample_log()).unwrap(), "ACTIVITY"), ["greet"]);
}
