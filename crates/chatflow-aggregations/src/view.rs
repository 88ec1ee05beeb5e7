//! Lazy per-case aggregation over an event-log view

use std::sync::Arc;

use chatflow_core::{AggregationError, EventTableExt, Result};
use chatflow_filters::EventLogView;
use polars::prelude::DataFrame;
use tracing::{debug, instrument};

use crate::aggregator::{CaseAggregator, CaseMap};
use crate::aux_ops::AuxOp;
use crate::cache::AuxCache;
use crate::spec::{AggValue, DynAggregator};

/// Chains aux ops in front of an aggregator; nothing runs until `compute`.
///
/// Like [`EventLogView`], every builder method returns a new value.
#[derive(Debug, Clone)]
pub struct CaseAggView {
    log_view: EventLogView,
    aux_ops: Vec<Arc<dyn AuxOp>>,
    cache: Option<Arc<AuxCache>>,
    aggregator: Option<DynAggregator>,
}

impl CaseAggView {
    pub fn new(log_view: EventLogView) -> Self {
        Self {
            log_view,
            aux_ops: Vec::new(),
            cache: None,
            aggregator: None,
        }
    }

    /// Append an aux op
    pub fn with_aux(&self, op: impl AuxOp + 'static) -> Self {
        self.with_aux_shared(Arc::new(op))
    }

    pub fn with_aux_shared(&self, op: Arc<dyn AuxOp>) -> Self {
        let mut next = self.clone();
        next.aux_ops.push(op);
        next
    }

    /// Route aux ops through a shared cache
    pub fn with_cache(&self, cache: Arc<AuxCache>) -> Self {
        let mut next = self.clone();
        next.cache = Some(cache);
        next
    }

    /// Store an aggregator for [`to_map`](Self::to_map)
    pub fn with_aggregator(&self, aggregator: DynAggregator) -> Self {
        let mut next = self.clone();
        next.aggregator = Some(aggregator);
        next
    }

    pub fn log_view(&self) -> &EventLogView {
        &self.log_view
    }

    pub fn aux_ops(&self) -> &[Arc<dyn AuxOp>] {
        &self.aux_ops
    }

    /// Materialize the log view and run every aux op in order
    pub fn prepared(&self) -> Result<DataFrame> {
        let mut table = self.log_view.compute()?;
        for op in &self.aux_ops {
            table = match &self.cache {
                Some(cache) => cache.get_or_apply(op.as_ref(), &table)?.as_ref().clone(),
                None => op.apply(&table)?,
            };
        }
        Ok(table)
    }

    /// Run `aggregator` on the prepared table
    #[instrument(skip(self, aggregator), fields(aggregator = aggregator.name()))]
    pub fn compute<A: CaseAggregator>(&self, aggregator: &A) -> Result<CaseMap<A::Output>> {
        let table = self.prepared()?;
        table.require_columns(&aggregator.required_columns())?;
        let out = aggregator.aggregate(&table)?;
        debug!(cases = out.len(), "cases aggregated");
        Ok(out)
    }

    /// Run the stored aggregator
    pub fn to_map(&self) -> Result<CaseMap<AggValue>> {
        let aggregator = self
            .aggregator
            .as_ref()
            .ok_or(AggregationError::MissingAggregator)?;
        self.compute(aggregator)
    }
}
