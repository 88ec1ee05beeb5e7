//! Declarative aggregator descriptions

use chatflow_core::{AggregationError, Result};
use chrono::TimeDelta;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::aggregator::{CaseAggregator, CaseMap};
use crate::aggregators::{
    CaseDateAggregator, CaseDurationAggregator, CaseVariantAggregator, DEFAULT_JOINER,
};
use crate::models::VariantInfo;

fn default_joiner() -> String {
    DEFAULT_JOINER.to_string()
}

/// Serializable description of a built-in aggregator,
/// e.g. `{"type": "variant", "ignore_syst": true}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregatorSpec {
    Variant {
        #[serde(default)]
        ignore_syst: bool,
        #[serde(default = "default_joiner")]
        joiner: String,
    },
    CaseDate,
    CaseDuration,
}

impl AggregatorSpec {
    /// Parse a JSON description
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| AggregationError::InvalidSpec(err.to_string()).into())
    }

    /// Build the concrete aggregator
    pub fn build(&self) -> Result<DynAggregator> {
        let aggregator = match self {
            Self::Variant {
                ignore_syst,
                joiner,
            } => {
                if joiner.is_empty() {
                    return Err(AggregationError::InvalidSpec(
                        "variant joiner must not be empty".to_string(),
                    )
                    .into());
                }
                DynAggregator::Variant(CaseVariantAggregator::new(*ignore_syst, joiner.clone()))
            }
            Self::CaseDate => DynAggregator::Date(CaseDateAggregator),
            Self::CaseDuration => DynAggregator::Duration(CaseDurationAggregator),
        };
        Ok(aggregator)
    }
}

/// Output of a [`DynAggregator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggValue {
    Variant(VariantInfo),
    Date(Option<String>),
    Duration(TimeDelta),
}

/// Any built-in aggregator behind a single type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynAggregator {
    Variant(CaseVariantAggregator),
    Date(CaseDateAggregator),
    Duration(CaseDurationAggregator),
}

fn wrap<T>(map: CaseMap<T>, f: fn(T) -> AggValue) -> CaseMap<AggValue> {
    map.into_iter().map(|(case, value)| (case, f(value))).collect()
}

impl CaseAggregator for DynAggregator {
    type Output = AggValue;

    fn name(&self) -> &str {
        match self {
            Self::Variant(inner) => inner.name(),
            Self::Date(inner) => inner.name(),
            Self::Duration(inner) => inner.name(),
        }
    }

    fn required_columns(&self) -> Vec<&'static str> {
        match self {
            Self::Variant(inner) => inner.required_columns(),
            Self::Date(inner) => inner.required_columns(),
            Self::Duration(inner) => inner.required_columns(),
        }
    }

    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<AggValue>> {
        Ok(match self {
            Self::Variant(inner) => wrap(inner.aggregate(table)?, AggValue::Variant),
            Self::Date(inner) => wrap(inner.aggregate(table)?, AggValue::Date),
            Self::Duration(inner) => wrap(inner.aggregate(table)?, AggValue::Duration),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let spec = AggregatorSpec::from_json(r#"{"type": "variant"}"#).unwrap();
        assert_eq!(
            spec,
            AggregatorSpec::Variant {
                ignore_syst: false,
                joiner: ">".to_string()
            }
        );
        assert_eq!(spec.build().unwrap().name(), "variant");
    }

    #[test]
    fn test_unknown_aggregator() {
        let err = AggregatorSpec::from_json(r#"{"type": "median"}"#).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Aggregation error: Invalid aggregator spec"));
    }

    #[test]
    fn test_empty_joiner_rejected() {
        let spec = AggregatorSpec::from_json(r#"{"type": "variant", "joiner": ""}"#).unwrap();
        assert!(spec.build().is_err());
    }
}
