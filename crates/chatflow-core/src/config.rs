//! Configuration types shared by the chatflow crates

use serde::{Deserialize, Serialize};

use crate::schema::REQUIRED_COLUMNS;

/// Column dropped from raw exports before validation
pub const DEFAULT_DROP_COLUMN: &str = "duration_seconds";

/// Options for reading an event log from CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Field separator byte
    pub separator: u8,
    /// Columns removed (when present) before validation
    pub drop_columns: Vec<String>,
    /// Columns the loaded table must carry
    pub required_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            drop_columns: vec![DEFAULT_DROP_COLUMN.to_string()],
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl LoadOptions {
    /// Use a different field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Replace the list of columns to drop
    pub fn with_drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the required column set
    pub fn with_required_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Eviction policy for caller-owned caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CachePolicy {
    /// No caching, every lookup computes
    NoCache,
    /// Least recently used eviction
    Lru { max_entries: usize },
    /// Never evict, only add
    Unbounded,
}

impl CachePolicy {
    /// Get the name of this policy
    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCache => "no_cache",
            Self::Lru { .. } => "lru",
            Self::Unbounded => "unbounded",
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_options_defaults() {
        let options = LoadOptions::default();
        assert_eq!(options.separator, b',');
        assert_eq!(options.drop_columns, ["duration_seconds"]);
        assert_eq!(options.required_columns.len(), 4);
    }

    #[test]
    fn test_cache_policy_serde() {
        let json = serde_json::to_string(&CachePolicy::Lru { max_entries: 8 }).unwrap();
        assert_eq!(json, r#"{"policy":"lru","max_entries":8}"#);
        let back: CachePolicy = serde_json::from_str(r#"{"policy":"no_cache"}"#).unwrap();
        assert_eq!(back, CachePolicy::NoCache);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entries: 1,
        };
        assert!((stats.hit_rate() - 0.75).abs() < 1e-12);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
