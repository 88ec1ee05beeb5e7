//! Event table foundation for chatflow-miner
//!
//! Every other chatflow crate builds on the pieces defined here: the column
//! schema and its validator, CSV input and output, per-case trace extraction,
//! the content fingerprint used as a structural cache key, and the shared
//! error taxonomy.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatflow_core::{load_csv, case_traces, LoadOptions};
//!
//! let table = load_csv("conversations.csv", &LoadOptions::default())?;
//! for trace in case_traces(&table)? {
//!     println!("{}: {:?}", trace.case_id, trace.activities().collect::<Vec<_>>());
//! }
//! ```

mod config;
mod error;
mod load;
pub mod schema;
mod table;
mod trace;

pub use config::*;
pub use error::{AggregationError, Error, FilterError, RegistryError, Result, SchemaError};
pub use load::{load_csv, write_csv};
pub use schema::{verify, verify_format};
pub use table::{EventTableExt, TableFingerprint};
pub use trace::{case_traces, CaseTrace, TraceEvent};
