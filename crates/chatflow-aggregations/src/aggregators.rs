//! Built-in case aggregators

use std::collections::{BTreeMap, HashMap};

use chatflow_core::schema::{
    micros_to_datetime, COLUMN_ACTIVITY, COLUMN_AGENT, COLUMN_CASE_ID, COLUMN_END_TS,
    COLUMN_START_TS,
};
use chatflow_core::{case_traces, EventTableExt, Result};
use chrono::TimeDelta;
use polars::prelude::DataFrame;
use tracing::debug;

use crate::aggregator::{CaseAggregator, CaseMap};
use crate::models::VariantInfo;

const SYSTEM_AGENT: &str = "syst";
/// Default separator between activities of a variant string
pub const DEFAULT_JOINER: &str = ">";

/// Computes the variant followed by each case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseVariantAggregator {
    ignore_syst: bool,
    joiner: String,
}

impl CaseVariantAggregator {
    pub fn new(ignore_syst: bool, joiner: impl Into<String>) -> Self {
        Self {
            ignore_syst,
            joiner: joiner.into(),
        }
    }

    /// Leave system events out of the activity sequences
    pub fn ignoring_syst(mut self) -> Self {
        self.ignore_syst = true;
        self
    }

    pub fn joiner(&self) -> &str {
        &self.joiner
    }
}

impl Default for CaseVariantAggregator {
    fn default() -> Self {
        Self::new(false, DEFAULT_JOINER)
    }
}

impl CaseAggregator for CaseVariantAggregator {
    type Output = VariantInfo;

    fn name(&self) -> &str {
        "variant"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_ACTIVITY, COLUMN_START_TS]
    }

    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<VariantInfo>> {
        table.require_columns(&self.required_columns())?;
        let drop_syst = self.ignore_syst && table.has_column(COLUMN_AGENT);

        let sequences: Vec<(String, Vec<String>)> = case_traces(table)?
            .into_iter()
            .map(|trace| {
                let activities = trace
                    .events
                    .into_iter()
                    .filter(|event| {
                        !drop_syst
                            || !event
                                .agent
                                .as_deref()
                                .is_some_and(|agent| agent.trim().eq_ignore_ascii_case(SYSTEM_AGENT))
                    })
                    .map(|event| event.activity)
                    .collect();
                (trace.case_id, activities)
            })
            .collect();

        let mut frequency: HashMap<String, usize> = HashMap::new();
        for (_, activities) in &sequences {
            *frequency.entry(activities.join(&self.joiner)).or_default() += 1;
        }

        let mut ranked: Vec<(&String, &usize)> = frequency.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let rank: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(index, (variant, _))| (variant.as_str(), index + 1))
            .collect();

        let mut out = CaseMap::new();
        for (case_id, activities) in &sequences {
            let variant = activities.join(&self.joiner);
            let info = VariantInfo {
                variant_id: format!("variant {}", rank[variant.as_str()]),
                hash: blake3::hash(variant.as_bytes()).to_hex().to_string(),
                frequency: frequency[&variant],
                length: activities.len(),
                activities: activities.clone(),
                variant,
            };
            out.insert(case_id.clone(), info);
        }

        debug!(cases = out.len(), variants = frequency.len(), "variants computed");
        Ok(out)
    }
}

/// Earliest start and latest end (defaulting to start) of every case
fn case_bounds(table: &DataFrame) -> Result<BTreeMap<String, Option<(i64, i64)>>> {
    let cases = table.string_values(COLUMN_CASE_ID)?;
    let starts = table.timestamp_values(COLUMN_START_TS)?;
    let ends = if table.has_column(COLUMN_END_TS) {
        table.timestamp_values(COLUMN_END_TS)?
    } else {
        vec![None; starts.len()]
    };

    let mut bounds: BTreeMap<String, Option<(i64, i64)>> = BTreeMap::new();
    for ((case, start), end) in cases.into_iter().zip(starts).zip(ends) {
        let Some(case) = case else {
            continue;
        };
        let slot = bounds.entry(case).or_insert(None);
        if let Some(start) = start {
            let end = end.unwrap_or(start);
            *slot = Some(match *slot {
                Some((lo, hi)) => (lo.min(start), hi.max(end)),
                None => (start, end),
            });
        }
    }
    Ok(bounds)
}

/// ISO date (`YYYY-MM-DD`) of each case's earliest start timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseDateAggregator;

impl CaseAggregator for CaseDateAggregator {
    type Output = Option<String>;

    fn name(&self) -> &str {
        "case_date"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_START_TS]
    }

    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<Option<String>>> {
        table.require_columns(&self.required_columns())?;
        let out = case_bounds(table)?
            .into_iter()
            .map(|(case, bounds)| {
                let date = bounds
                    .and_then(|(first, _)| micros_to_datetime(first))
                    .map(|dt| dt.date().format("%Y-%m-%d").to_string());
                (case, date)
            })
            .collect();
        Ok(out)
    }
}

/// Time from each case's first start to its last end.
///
/// A case without any valid timestamp lasts zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseDurationAggregator;

impl CaseAggregator for CaseDurationAggregator {
    type Output = TimeDelta;

    fn name(&self) -> &str {
        "case_duration"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        vec![COLUMN_CASE_ID, COLUMN_START_TS]
    }

    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<TimeDelta>> {
        table.require_columns(&self.required_columns())?;
        let out = case_bounds(table)?
            .into_iter()
            .map(|(case, bounds)| {
                let duration = bounds.map_or(TimeDelta::zero(), |(first, last)| {
                    TimeDelta::microseconds(last - first)
                });
                (case, duration)
            })
            .collect();
        Ok(out)
    }
}
