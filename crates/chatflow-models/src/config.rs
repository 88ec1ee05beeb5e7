//! Rendering options and batch policies

use serde::{Deserialize, Serialize};

/// Layout direction of a rendered graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankDir {
    /// Left to right
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Top to bottom
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "RL")]
    RightLeft,
    #[serde(rename = "BT")]
    BottomTop,
}

impl RankDir {
    /// Graphviz `rankdir` value
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftRight => "LR",
            Self::TopBottom => "TB",
            Self::RightLeft => "RL",
            Self::BottomTop => "BT",
        }
    }
}

/// Options for turning an artifact into a diagram.
///
/// Used as the render cache key, so every field takes part in equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Keep at most this many edges, heaviest first
    pub max_num_edges: Option<usize>,
    pub rank_dir: RankDir,
    pub bgcolor: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_num_edges: None,
            rank_dir: RankDir::default(),
            bgcolor: "white".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn with_max_num_edges(mut self, max_num_edges: usize) -> Self {
        self.max_num_edges = Some(max_num_edges);
        self
    }

    pub fn with_rank_dir(mut self, rank_dir: RankDir) -> Self {
        self.rank_dir = rank_dir;
        self
    }

    pub fn with_bgcolor(mut self, bgcolor: impl Into<String>) -> Self {
        self.bgcolor = bgcolor.into();
        self
    }
}

/// What a batch registry operation does when one entry fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Stop and return the error, tagged with the entry name
    #[default]
    Raise,
    /// Leave the entry out of the result
    Skip,
    /// Keep the entry with no value
    #[serde(rename = "none")]
    Null,
}

impl OnError {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raise => "raise",
            Self::Skip => "skip",
            Self::Null => "none",
        }
    }
}

/// What a multi-name lookup does with absent names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    #[default]
    Error,
    Skip,
    #[serde(rename = "none")]
    Null,
}

impl MissingPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Skip => "skip",
            Self::Null => "none",
        }
    }
}
