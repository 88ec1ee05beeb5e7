//! Per-case aggregations for chatflow event logs
//!
//! A [`CaseAggregator`] reduces an event table to one value per case:
//! the process variant, the case start date or the case duration.
//! Pre-processing steps ([`AuxOp`]) can be shared between aggregators
//! through a caller-owned [`AuxCache`], so the same table is only
//! prepared once.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chatflow_aggregations::{AuxCache, CaseAggView, CaseVariantAggregator, NormalizeTimestamps};
//! use chatflow_core::CachePolicy;
//!
//! let cache = AuxCache::shared(CachePolicy::Unbounded);
//! let view = CaseAggView::new(log_view)
//!     .with_aux(NormalizeTimestamps)
//!     .with_cache(Arc::clone(&cache));
//! let variants = view.compute(&CaseVariantAggregator::default())?;
//! ```

mod aggregator;
mod aggregators;
mod aux_ops;
mod cache;
mod models;
mod spec;
mod view;

pub use aggregator::{CaseAggregator, CaseMap, WithAux};
pub use aggregators::{
    CaseDateAggregator, CaseDurationAggregator, CaseVariantAggregator, DEFAULT_JOINER,
};
pub use aux_ops::{
    AuxOp, DeriveCaseStartDate, DeriveDurations, NormalizeTimestamps, DEFAULT_CASE_DATE_COLUMN,
    DEFAULT_DURATION_COLUMN,
};
pub use cache::AuxCache;
pub use models::VariantInfo;
pub use spec::{AggValue, AggregatorSpec, DynAggregator};
pub use view::CaseAggView;
