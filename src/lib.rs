//! Process mining for conversation logs
//!
//! Facade over the chatflow workspace crates:
//!
//! - [`core`]: event table schema, CSV input and output, case traces
//! - [`filters`]: composable row filters and lazy event-log views
//! - [`aggregations`]: per-case variants, start dates and durations
//! - [`models`]: directly-follows graphs, cached model views and the registry
//!
//! ```rust,ignore
//! use chatflow_miner::prelude::*;
//!
//! let table = load_csv("conversations.csv", &LoadOptions::default())?;
//! let humans = EventLogView::new(table).filter(AgentFilter::new("human", true)?);
//! let mut view = ProcessModelView::new(humans, DfgModel);
//! println!("{}", view.to_graphviz(&RenderOptions::default())?);
//! ```

pub use chatflow_aggregations as aggregations;
pub use chatflow_core as core;
pub use chatflow_filters as filters;
pub use chatflow_models as models;

/// The types most callers need
pub mod prelude {
    pub use chatflow_aggregations::{
        AuxCache, CaseAggView, CaseAggregator, CaseDateAggregator, CaseDurationAggregator,
        CaseVariantAggregator,
    };
    pub use chatflow_core::{load_csv, CachePolicy, Error, LoadOptions, Result};
    pub use chatflow_filters::{
        AgentFilter, EventLogView, Filter, FilterExt, FilterSpec, TimeWindowFilter,
    };
    pub use chatflow_models::{
        DfgModel, OnError, PerformanceDfgModel, ProcessModel, ProcessModelRegistry,
        ProcessModelView, RenderOptions,
    };
}
