//! Composable filters and lazy event-log views
//!
//! A [`Filter`] turns an event table into a boolean row mask. An
//! [`EventLogView`] keeps a shared base table and an ordered list of filters
//! and only materializes the filtered table when asked.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatflow_filters::{AgentFilter, EventLogView, FilterExt, TimeWindowFilter};
//!
//! let view = EventLogView::new(table)
//!     .filter(AgentFilter::new("ai", true)?)
//!     .filter(TimeWindowFilter::parse(Some("2024-03-01"), None)?);
//! let filtered = view.compute()?;
//! ```

mod builtins;
mod filter;
mod spec;
mod view;

pub use builtins::*;
pub use filter::{constant_mask, ensure_mask, AndFilter, Filter, FilterExt, NotFilter, OrFilter};
pub use spec::FilterSpec;
pub use view::EventLogView;
