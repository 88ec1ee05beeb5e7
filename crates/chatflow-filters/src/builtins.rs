//! Built-in filters for conversation event logs

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chatflow_core::schema::{
    parse_timestamp, COLUMN_ACTIVITY, COLUMN_AGENT, COLUMN_CASE_ID, COLUMN_END_TS,
    COLUMN_START_TS,
};
use chatflow_core::{case_traces, CaseTrace, EventTableExt, FilterError, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::filter::{constant_mask, Filter};

const SYSTEM_AGENT: &str = "syst";

/// Actor kinds an [`AgentFilter`] can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Ai,
    Human,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Human => "human",
        }
    }
}

impl FromStr for AgentKind {
    type Err = chatflow_core::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "human" => Ok(Self::Human),
            _ => Err(FilterError::InvalidValue {
                filter: "agent".to_string(),
                value: format!("agent must be 'ai' or 'human', got '{raw}'"),
            }
            .into()),
        }
    }
}

/// Keeps events of one actor kind, optionally together with every system event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFilter {
    agent: AgentKind,
    include_syst: bool,
}

impl AgentFilter {
    /// `agent` is "ai" or "human", case-insensitive
    pub fn new(agent: &str, include_syst: bool) -> Result<Self> {
        Ok(Self::from_kind(agent.parse()?, include_syst))
    }

    pub fn from_kind(agent: AgentKind, include_syst: bool) -> Self {
        Self {
            agent,
            include_syst,
        }
    }

    pub fn agent(&self) -> AgentKind {
        self.agent
    }

    pub fn include_syst(&self) -> bool {
        self.include_syst
    }
}

impl Filter for AgentFilter {
    fn name(&self) -> &str {
        "agent"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_AGENT]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        table.require_columns(&[COLUMN_AGENT])?;
        let wanted = self.agent.name();
        let mask = table
            .string_values(COLUMN_AGENT)?
            .into_iter()
            .map(|value| {
                let value = value.map(|v| v.trim().to_lowercase());
                match value.as_deref() {
                    Some(v) if v == wanted => true,
                    Some(SYSTEM_AGENT) => self.include_syst,
                    _ => false,
                }
            })
            .collect();
        Ok(mask)
    }
}

/// How an event interval is compared with a time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Event lies entirely within the window
    #[default]
    Inside,
    /// Event overlaps the window
    Touches,
}

impl WindowMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inside => "inside",
            Self::Touches => "touches",
        }
    }
}

impl FromStr for WindowMode {
    type Err = chatflow_core::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "inside" => Ok(Self::Inside),
            "touches" => Ok(Self::Touches),
            other => Err(FilterError::InvalidValue {
                filter: "time_window".to_string(),
                value: format!("unknown mode '{other}'"),
            }
            .into()),
        }
    }
}

/// Keeps events whose `[start, end]` interval relates to a time window.
///
/// A missing end timestamp (null, or no end column) is taken to be the
/// start. Without any bound every event is kept; otherwise events with no
/// start timestamp are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindowFilter {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    mode: WindowMode,
}

impl TimeWindowFilter {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            start,
            end,
            mode: WindowMode::default(),
        }
    }

    /// Build from timestamp strings in any format the schema validator accepts
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let bound = |raw: Option<&str>| -> Result<Option<NaiveDateTime>> {
            raw.map(|value| {
                parse_timestamp(value)
                    .and_then(chatflow_core::schema::micros_to_datetime)
                    .ok_or_else(|| {
                        chatflow_core::Error::from(FilterError::InvalidValue {
                            filter: "time_window".to_string(),
                            value: value.to_string(),
                        })
                    })
            })
            .transpose()
        };
        Ok(Self::new(bound(start)?, bound(end)?))
    }

    pub fn with_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    fn keeps(&self, start: i64, end: i64) -> bool {
        let lower = self.start.map(|dt| dt.and_utc().timestamp_micros());
        let upper = self.end.map(|dt| dt.and_utc().timestamp_micros());
        match self.mode {
            WindowMode::Inside => {
                lower.map_or(true, |lo| start >= lo) && upper.map_or(true, |hi| end <= hi)
            }
            WindowMode::Touches => {
                lower.map_or(true, |lo| end >= lo) && upper.map_or(true, |hi| start <= hi)
            }
        }
    }
}

impl Filter for TimeWindowFilter {
    fn name(&self) -> &str {
        "time_window"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_START_TS]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        table.require_columns(&[COLUMN_START_TS])?;
        if self.start.is_none() && self.end.is_none() {
            return Ok(constant_mask(true, table.height()));
        }
        let starts = table.timestamp_values(COLUMN_START_TS)?;
        let ends = if table.has_column(COLUMN_END_TS) {
            table.timestamp_values(COLUMN_END_TS)?
        } else {
            vec![None; starts.len()]
        };
        let mask = starts
            .into_iter()
            .zip(ends)
            .map(|(start, end)| match start {
                Some(start) => self.keeps(start, end.unwrap_or(start)),
                None => false,
            })
            .collect();
        Ok(mask)
    }
}

fn mask_for_cases(table: &DataFrame, cases: &HashSet<String>) -> Result<BooleanChunked> {
    let mask = table
        .string_values(COLUMN_CASE_ID)?
        .into_iter()
        .map(|case| case.is_some_and(|case| cases.contains(&case)))
        .collect();
    Ok(mask)
}

/// Keeps every event of the listed cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFilter {
    cases: HashSet<String>,
}

impl CaseFilter {
    pub fn new<I, S>(cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cases: cases.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for CaseFilter {
    fn name(&self) -> &str {
        "case"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        table.require_columns(&[COLUMN_CASE_ID])?;
        mask_for_cases(table, &self.cases)
    }
}

/// Keeps every event of the cases containing an activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseHasActivityFilter {
    activity: String,
}

impl CaseHasActivityFilter {
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
        }
    }
}

impl Filter for CaseHasActivityFilter {
    fn name(&self) -> &str {
        "case_has_activity"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_ACTIVITY]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        table.require_columns(&[COLUMN_CASE_ID, COLUMN_ACTIVITY])?;
        let cases: HashSet<String> = table
            .string_values(COLUMN_CASE_ID)?
            .into_iter()
            .zip(table.string_values(COLUMN_ACTIVITY)?)
            .filter_map(|(case, activity)| {
                (activity.as_deref() == Some(self.activity.as_str()))
                    .then_some(case)
                    .flatten()
            })
            .collect();
        mask_for_cases(table, &cases)
    }
}

/// Keep all rows of the traces matching `predicate`
fn mask_for_traces<P>(table: &DataFrame, predicate: P) -> Result<BooleanChunked>
where
    P: Fn(&CaseTrace) -> bool,
{
    let mut keep = vec![false; table.height()];
    for trace in case_traces(table)? {
        if predicate(&trace) {
            for row in trace.rows() {
                keep[row] = true;
            }
        }
    }
    Ok(keep.into_iter().collect())
}

/// Keeps every event of the cases where `succ` immediately follows `pred`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectlyFollowsFilter {
    pred: String,
    succ: String,
}

impl DirectlyFollowsFilter {
    pub fn new(pred: impl Into<String>, succ: impl Into<String>) -> Self {
        Self {
            pred: pred.into(),
            succ: succ.into(),
        }
    }
}

impl Filter for DirectlyFollowsFilter {
    fn name(&self) -> &str {
        "directly_follows"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_ACTIVITY, COLUMN_START_TS]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        mask_for_traces(table, |trace| {
            trace
                .events
                .windows(2)
                .any(|pair| pair[0].activity == self.pred && pair[1].activity == self.succ)
        })
    }
}

/// Keeps every event of the cases where `succ` occurs some time after `pred`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventuallyFollowsFilter {
    pred: String,
    succ: String,
}

impl EventuallyFollowsFilter {
    pub fn new(pred: impl Into<String>, succ: impl Into<String>) -> Self {
        Self {
            pred: pred.into(),
            succ: succ.into(),
        }
    }
}

impl Filter for EventuallyFollowsFilter {
    fn name(&self) -> &str {
        "eventually_follows"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_ACTIVITY, COLUMN_START_TS]
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        mask_for_traces(table, |trace| {
            let mut seen_pred = false;
            trace.activities().any(|activity| {
                let hit = seen_pred && activity == self.succ;
                seen_pred |= activity == self.pred;
                hit
            })
        })
    }
}

impl fmt::Display for TimeWindowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |bound: Option<NaiveDateTime>| bound.map_or("..".to_string(), |dt| dt.to_string());
        write!(f, "{}[{}, {}]", self.mode.name(), show(self.start), show(self.end))
    }
}
