//! Directly-follows graph discovery
//!
//! Each case is read as its ordered trace (start timestamp, then row order,
//! events without a start last). Every pair of consecutive events adds one
//! to the edge `(pred, succ)`; the first and last activity of the trace are
//! counted as start and end activities.

use std::collections::BTreeMap;

use chatflow_core::{case_traces, Error, Result};
use polars::prelude::DataFrame;
use tracing::{debug, instrument};

use crate::artifact::{Diagram, Dfg, Edge, EdgePerformance, ModelArtifact, PerformanceDfg};
use crate::config::RenderOptions;
use crate::model::ProcessModel;
use crate::render::{render_dfg, render_performance_dfg};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Frequency DFG of `table`
#[instrument(skip(table), fields(rows = table.height()))]
pub fn discover_dfg(table: &DataFrame) -> Result<Dfg> {
    let mut dfg = Dfg::default();
    if table.height() == 0 {
        return Ok(dfg);
    }

    for trace in case_traces(table)? {
        let activities: Vec<&str> = trace.activities().collect();
        if let (Some(first), Some(last)) = (activities.first(), activities.last()) {
            *dfg.start_activities.entry(first.to_string()).or_default() += 1;
            *dfg.end_activities.entry(last.to_string()).or_default() += 1;
        }
        for pair in activities.windows(2) {
            *dfg
                .edges
                .entry((pair[0].to_string(), pair[1].to_string()))
                .or_default() += 1;
        }
    }

    debug!(edges = dfg.edges.len(), "dfg discovered");
    Ok(dfg)
}

/// DFG of `table` with the mean waiting time of every edge.
///
/// The wait of a pair is the successor's start minus the predecessor's end
/// (end defaulting to start), floored at zero. Pairs with a missing start
/// count towards the edge but not towards its mean.
#[instrument(skip(table), fields(rows = table.height()))]
pub fn discover_performance_dfg(table: &DataFrame) -> Result<PerformanceDfg> {
    let mut dfg = PerformanceDfg::default();
    if table.height() == 0 {
        return Ok(dfg);
    }

    // (count, measured pairs, total seconds)
    let mut totals: BTreeMap<Edge, (u64, u64, f64)> = BTreeMap::new();
    for trace in case_traces(table)? {
        if let (Some(first), Some(last)) = (trace.events.first(), trace.events.last()) {
            *dfg.start_activities.entry(first.activity.clone()).or_default() += 1;
            *dfg.end_activities.entry(last.activity.clone()).or_default() += 1;
        }
        for pair in trace.events.windows(2) {
            let (pred, succ) = (&pair[0], &pair[1]);
            let slot = totals
                .entry((pred.activity.clone(), succ.activity.clone()))
                .or_default();
            slot.0 += 1;
            if let (Some(pred_end), Some(succ_start)) = (pred.end_or_start(), succ.start) {
                slot.1 += 1;
                slot.2 += (succ_start - pred_end).max(0) as f64 / MICROS_PER_SECOND;
            }
        }
    }

    dfg.edges = totals
        .into_iter()
        .map(|(edge, (count, measured, total))| {
            let mean_seconds = if measured == 0 {
                0.0
            } else {
                total / measured as f64
            };
            (edge, EdgePerformance { count, mean_seconds })
        })
        .collect();

    debug!(edges = dfg.edges.len(), "performance dfg discovered");
    Ok(dfg)
}

fn wrong_kind(model: &str, artifact: &ModelArtifact) -> Error {
    Error::Model(format!(
        "model '{model}' cannot render a {} artifact",
        artifact.kind()
    ))
}

/// Frequency directly-follows graph model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DfgModel;

impl ProcessModel for DfgModel {
    fn name(&self) -> &str {
        "dfg"
    }

    fn compute(&self, table: &DataFrame) -> Result<ModelArtifact> {
        Ok(ModelArtifact::Frequency(discover_dfg(table)?))
    }

    fn to_graphviz(&self, artifact: &ModelArtifact, options: &RenderOptions) -> Result<Diagram> {
        match artifact {
            ModelArtifact::Frequency(dfg) => Ok(render_dfg(dfg, options)),
            other => Err(wrong_kind(self.name(), other)),
        }
    }
}

/// Directly-follows graph model annotated with mean waiting times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceDfgModel;

impl ProcessModel for PerformanceDfgModel {
    fn name(&self) -> &str {
        "performance_dfg"
    }

    fn compute(&self, table: &DataFrame) -> Result<ModelArtifact> {
        Ok(ModelArtifact::Performance(discover_performance_dfg(table)?))
    }

    fn to_graphviz(&self, artifact: &ModelArtifact, options: &RenderOptions) -> Result<Diagram> {
        match artifact {
            ModelArtifact::Performance(dfg) => Ok(render_performance_dfg(dfg, options)),
            other => Err(wrong_kind(self.name(), other)),
        }
    }
}
