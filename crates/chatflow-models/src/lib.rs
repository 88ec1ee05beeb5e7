//! Directly-follows process models for chatflow event logs
//!
//! A [`ProcessModel`] turns an event table into a [`ModelArtifact`] and
//! renders it as Graphviz DOT. [`ProcessModelView`] binds a model to an
//! [`EventLogView`](chatflow_filters::EventLogView) and caches both the
//! artifact (keyed by the content of the materialized view) and the
//! rendered diagrams. [`ProcessModelRegistry`] keeps named views in order.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatflow_filters::EventLogView;
//! use chatflow_models::{DfgModel, ProcessModelRegistry, ProcessModelView, RenderOptions};
//!
//! let mut registry = ProcessModelRegistry::new();
//! registry.set("all conversations", ProcessModelView::new(EventLogView::new(table), DfgModel))?;
//! let diagram = registry
//!     .view_mut("all conversations")?
//!     .to_graphviz(&RenderOptions::default().with_max_num_edges(20))?;
//! println!("{diagram}");
//! ```

mod artifact;
mod config;
mod dfg;
mod model;
mod registry;
mod render;
mod view;

pub use artifact::{Diagram, Dfg, Edge, EdgePerformance, ModelArtifact, PerformanceDfg};
pub use config::{MissingPolicy, OnError, RankDir, RenderOptions};
pub use dfg::{discover_dfg, discover_performance_dfg, DfgModel, PerformanceDfgModel};
pub use model::ProcessModel;
pub use registry::{ProcessModelRegistry, RegistryEntry, PLACEHOLDER_NAME};
pub use render::{render_dfg, render_performance_dfg, select_edges};
pub use view::ProcessModelView;
