//! Value types produced by the aggregators

use serde::{Deserialize, Serialize};

/// A process variant: the ordered activity sequence shared by some cases
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantInfo {
    /// Rank label, "variant 1" being the most frequent
    pub variant_id: String,
    /// Activities joined with the aggregator's joiner
    pub variant: String,
    pub activities: Vec<String>,
    /// blake3 hex digest of `variant`, stable across runs
    pub hash: String,
    /// Number of cases following this variant
    pub frequency: usize,
    /// Number of activities
    pub length: usize,
}
