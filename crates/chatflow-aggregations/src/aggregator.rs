//! Case aggregator contract

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chatflow_core::Result;
use polars::prelude::DataFrame;

use crate::aux_ops::AuxOp;
use crate::cache::AuxCache;

/// Per-case results keyed by the case id rendered as a string
pub type CaseMap<T> = BTreeMap<String, T>;

/// Computes one value per case of an event table
pub trait CaseAggregator: fmt::Debug {
    type Output;

    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Columns the aggregation reads
    fn required_columns(&self) -> Vec<&'static str>;

    /// One entry per case; the table is left untouched
    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<Self::Output>>;

    /// Run `op` (through `cache`) before aggregating
    fn with_aux(self, op: Arc<dyn AuxOp>, cache: Arc<AuxCache>) -> WithAux<Self>
    where
        Self: Sized,
    {
        WithAux::new(self, op, cache)
    }
}

/// An aggregator preceded by a cached aux op
#[derive(Debug)]
pub struct WithAux<A> {
    inner: A,
    op: Arc<dyn AuxOp>,
    cache: Arc<AuxCache>,
}

impl<A: CaseAggregator> WithAux<A> {
    pub fn new(inner: A, op: Arc<dyn AuxOp>, cache: Arc<AuxCache>) -> Self {
        Self { inner, op, cache }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn cache(&self) -> &Arc<AuxCache> {
        &self.cache
    }
}

impl<A: CaseAggregator> CaseAggregator for WithAux<A> {
    type Output = A::Output;

    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Columns of the aux op and of the wrapped aggregator
    fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = self.op.required_columns();
        columns.extend(self.inner.required_columns());
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    fn aggregate(&self, table: &DataFrame) -> Result<CaseMap<Self::Output>> {
        let prepared = self.cache.get_or_apply(self.op.as_ref(), table)?;
        self.inner.aggregate(&prepared)
    }
}
