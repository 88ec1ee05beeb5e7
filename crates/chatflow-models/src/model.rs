//! Process model contract

use std::fmt;

use chatflow_core::Result;
use polars::prelude::DataFrame;

use crate::artifact::{Diagram, ModelArtifact};
use crate::config::RenderOptions;

/// Discovers a process model from an event table and renders it
pub trait ProcessModel: fmt::Debug + Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Discover the model; an empty table yields an empty artifact
    fn compute(&self, table: &DataFrame) -> Result<ModelArtifact>;

    /// Render an artifact previously returned by [`compute`](Self::compute)
    fn to_graphviz(&self, artifact: &ModelArtifact, options: &RenderOptions) -> Result<Diagram>;
}
