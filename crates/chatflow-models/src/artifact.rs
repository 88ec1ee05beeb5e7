//! Computed process models and their rendered form

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Directed edge between two activities, `(predecessor, successor)`
pub type Edge = (String, String);

/// Frequency directly-follows graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfg {
    /// How often the successor immediately follows the predecessor
    pub edges: BTreeMap<Edge, u64>,
    /// How many cases begin with each activity
    pub start_activities: BTreeMap<String, u64>,
    /// How many cases end with each activity
    pub end_activities: BTreeMap<String, u64>,
}

impl Dfg {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.start_activities.is_empty() && self.end_activities.is_empty()
    }

    /// Weight of one edge, zero when absent
    pub fn weight(&self, pred: &str, succ: &str) -> u64 {
        self.edges
            .get(&(pred.to_string(), succ.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Every activity appearing in an edge or as a start/end activity
    pub fn activities(&self) -> BTreeSet<&str> {
        self.edges
            .keys()
            .flat_map(|(pred, succ)| [pred.as_str(), succ.as_str()])
            .chain(self.start_activities.keys().map(String::as_str))
            .chain(self.end_activities.keys().map(String::as_str))
            .collect()
    }
}

/// Waiting time statistics of one edge
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgePerformance {
    /// Number of observations of the edge
    pub count: u64,
    /// Mean seconds between the predecessor's end and the successor's start
    pub mean_seconds: f64,
}

/// Directly-follows graph annotated with waiting times
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceDfg {
    pub edges: BTreeMap<Edge, EdgePerformance>,
    pub start_activities: BTreeMap<String, u64>,
    pub end_activities: BTreeMap<String, u64>,
}

impl PerformanceDfg {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.start_activities.is_empty() && self.end_activities.is_empty()
    }
}

/// Output of a process model computation
#[derive(Debug, Clone, PartialEq)]
pub enum ModelArtifact {
    Frequency(Dfg),
    Performance(PerformanceDfg),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Frequency(_) => "frequency",
            Self::Performance(_) => "performance",
        }
    }

    pub fn as_dfg(&self) -> Option<&Dfg> {
        match self {
            Self::Frequency(dfg) => Some(dfg),
            Self::Performance(_) => None,
        }
    }

    pub fn as_performance(&self) -> Option<&PerformanceDfg> {
        match self {
            Self::Performance(dfg) => Some(dfg),
            Self::Frequency(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Frequency(dfg) => dfg.is_empty(),
            Self::Performance(dfg) => dfg.is_empty(),
        }
    }
}

/// Graphviz DOT source of a rendered model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagram {
    dot: String,
}

impl Diagram {
    pub fn new(dot: impl Into<String>) -> Self {
        Self { dot: dot.into() }
    }

    pub fn dot(&self) -> &str {
        &self.dot
    }

    pub fn into_dot(self) -> String {
        self.dot
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dot)
    }
}
