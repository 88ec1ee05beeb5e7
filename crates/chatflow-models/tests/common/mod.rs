//! Common test utilities for chatflow-models tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chatflow_core::{verify_format, Error, Result};
use chatflow_models::{
    discover_dfg, render_dfg, Diagram, ModelArtifact, ProcessModel, RenderOptions,
};
use polars::prelude::*;

/// Validated event table built from (case, activity, start, end) rows
pub fn event_table(events: &[(&str, &str, &str, Option<&str>)]) -> DataFrame {
    let raw = df![
        "CASE_ID" => events.iter().map(|e| e.0).collect::<Vec<_>>(),
        "ACTIVITY" => events.iter().map(|e| e.1).collect::<Vec<_>>(),
        "START_TIMESTAMP" => events.iter().map(|e| e.2).collect::<Vec<_>>(),
        "END_TIMESTAMP" => events.iter().map(|e| e.3).collect::<Vec<_>>(),
    ]
    .unwrap();
    verify_format(&raw).unwrap()
}

/// c1: A, B, C and c2: A, C
pub fn two_cases() -> DataFrame {
    event_table(&[
        ("c1", "A", "2024-05-01 10:00:00", None),
        ("c1", "B", "2024-05-01 10:01:00", None),
        ("c1", "C", "2024-05-01 10:02:00", None),
        ("c2", "A", "2024-05-01 10:00:00", None),
        ("c2", "C", "2024-05-01 10:01:00", None),
    ])
}

/// Frequency DFG model counting how often each method runs
#[derive(Debug, Default)]
pub struct CountingModel {
    computes: AtomicUsize,
    renders: AtomicUsize,
}

impl CountingModel {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn computes(&self) -> usize {
        self.computes.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl ProcessModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    fn compute(&self, table: &DataFrame) -> Result<ModelArtifact> {
        self.computes.fetch_add(1, Ordering::SeqCst);
        Ok(ModelArtifact::Frequency(discover_dfg(table)?))
    }

    fn to_graphviz(&self, artifact: &ModelArtifact, options: &RenderOptions) -> Result<Diagram> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let dfg = artifact
            .as_dfg()
            .ok_or_else(|| Error::Model("expected a frequency artifact".to_string()))?;
        Ok(render_dfg(dfg, options))
    }
}

/// Model that always fails to compute
#[derive(Debug, Default)]
pub struct FailingModel;

impl ProcessModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    fn compute(&self, _table: &DataFrame) -> Result<ModelArtifact> {
        Err(Error::Model("discovery failed".to_string()))
    }

    fn to_graphviz(&self, _artifact: &ModelArtifact, _options: &RenderOptions) -> Result<Diagram> {
        Err(Error::Model("rendering failed".to_string()))
    }
}
