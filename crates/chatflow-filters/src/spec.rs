//! Declarative filter descriptions
//!
//! A [`FilterSpec`] is the serializable form of a filter, for example
//! `{"type": "agent", "agent": "ai", "include_syst": true}`. Building it
//! yields the concrete filter as a shared trait object.

use std::sync::Arc;

use chatflow_core::{FilterError, Result};
use serde::{Deserialize, Serialize};

use crate::builtins::{
    AgentFilter, CaseFilter, CaseHasActivityFilter, DirectlyFollowsFilter,
    EventuallyFollowsFilter, TimeWindowFilter, WindowMode,
};
use crate::filter::{AndFilter, Filter, NotFilter, OrFilter};

fn default_include_syst() -> bool {
    true
}

/// Serializable description of any built-in filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterSpec {
    Agent {
        agent: String,
        #[serde(default = "default_include_syst")]
        include_syst: bool,
    },
    TimeWindow {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
        #[serde(default)]
        mode: WindowMode,
    },
    Case {
        cases: Vec<String>,
    },
    CaseHasActivity {
        activity: String,
    },
    DirectlyFollows {
        pred: String,
        succ: String,
    },
    EventuallyFollows {
        pred: String,
        succ: String,
    },
    And {
        filters: Vec<FilterSpec>,
    },
    Or {
        filters: Vec<FilterSpec>,
    },
    Not {
        filter: Box<FilterSpec>,
    },
}

impl FilterSpec {
    /// Parse a JSON description
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FilterError::InvalidSpec(err.to_string()).into())
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| FilterError::InvalidSpec(err.to_string()).into())
    }

    /// Build the concrete filter
    pub fn build(&self) -> Result<Arc<dyn Filter>> {
        let filter: Arc<dyn Filter> = match self {
            Self::Agent {
                agent,
                include_syst,
            } => Arc::new(AgentFilter::new(agent, *include_syst)?),
            Self::TimeWindow { start, end, mode } => Arc::new(
                TimeWindowFilter::parse(start.as_deref(), end.as_deref())?.with_mode(*mode),
            ),
            Self::Case { cases } => Arc::new(CaseFilter::new(cases.iter().cloned())),
            Self::CaseHasActivity { activity } => {
                Arc::new(CaseHasActivityFilter::new(activity.clone()))
            }
            Self::DirectlyFollows { pred, succ } => {
                Arc::new(DirectlyFollowsFilter::new(pred.clone(), succ.clone()))
            }
            Self::EventuallyFollows { pred, succ } => {
                Arc::new(EventuallyFollowsFilter::new(pred.clone(), succ.clone()))
            }
            Self::And { filters } => fold(filters, "and", |l, r| {
                Arc::new(AndFilter::new(l, r)) as Arc<dyn Filter>
            })?,
            Self::Or { filters } => fold(filters, "or", |l, r| {
                Arc::new(OrFilter::new(l, r)) as Arc<dyn Filter>
            })?,
            Self::Not { filter } => Arc::new(NotFilter::new(filter.build()?)),
        };
        Ok(filter)
    }
}

fn fold<F>(specs: &[FilterSpec], kind: &str, combine: F) -> Result<Arc<dyn Filter>>
where
    F: Fn(Arc<dyn Filter>, Arc<dyn Filter>) -> Arc<dyn Filter>,
{
    let mut built = specs.iter().map(FilterSpec::build);
    let first = built
        .next()
        .ok_or_else(|| FilterError::InvalidSpec(format!("'{kind}' needs at least one filter")))??;
    built.try_fold(first, |acc, next| Ok(combine(acc, next?)))
}
