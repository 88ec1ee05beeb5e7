//! Lazy, immutable views over an event table

use std::path::Path;
use std::sync::Arc;

use chatflow_core::{write_csv, EventTableExt, Result, TableFingerprint};
use polars::prelude::*;
use tracing::{debug, instrument, trace};

use crate::filter::{constant_mask, ensure_mask, Filter};

/// A base table plus an ordered list of filters, applied on demand.
///
/// Views are immutable: [`filter`](Self::filter) returns a new view sharing
/// the same base table, and the filters are ANDed in insertion order when
/// the view is materialized.
#[derive(Debug, Clone)]
pub struct EventLogView {
    base: Arc<DataFrame>,
    filters: Vec<Arc<dyn Filter>>,
}

impl EventLogView {
    /// View over `table` with no filters
    pub fn new(table: DataFrame) -> Self {
        Self::from_shared(Arc::new(table))
    }

    /// View over an already shared table
    pub fn from_shared(base: Arc<DataFrame>) -> Self {
        Self {
            base,
            filters: Vec::new(),
        }
    }

    /// New view with `filter` appended
    pub fn filter(&self, filter: impl Filter + 'static) -> Self {
        self.filter_shared(Arc::new(filter))
    }

    /// New view with a shared filter appended
    pub fn filter_shared(&self, filter: Arc<dyn Filter>) -> Self {
        self.filter_many([filter])
    }

    /// New view with every filter of `filters` appended, in order
    pub fn filter_many<I>(&self, filters: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Filter>>,
    {
        let mut next = self.filters.clone();
        next.extend(filters);
        Self {
            base: Arc::clone(&self.base),
            filters: next,
        }
    }

    /// The unfiltered table
    pub fn base(&self) -> &Arc<DataFrame> {
        &self.base
    }

    /// Filters in application order
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Conjunction of every filter mask over the base table
    pub fn mask(&self) -> Result<BooleanChunked> {
        let height = self.base.height();
        let mut combined = constant_mask(true, height);
        for filter in &self.filters {
            let mask = ensure_mask(filter.name(), filter.mask(&self.base)?, height)?;
            trace!(filter = filter.name(), kept = mask.num_trues(), "filter mask");
            combined = &combined & &mask;
        }
        Ok(combined)
    }

    /// Materialize the view.
    ///
    /// The first failing filter aborts and its error is returned unchanged.
    #[instrument(skip(self), fields(filters = self.filters.len()))]
    pub fn compute(&self) -> Result<DataFrame> {
        if self.filters.is_empty() {
            return Ok(self.base.as_ref().clone());
        }
        let mask = self.mask()?;
        let table = self.base.filter(&mask)?;
        debug!(
            rows_in = self.base.height(),
            rows_out = table.height(),
            "view materialized"
        );
        Ok(table)
    }

    /// First `n` rows of the materialized view
    pub fn head(&self, n: usize) -> Result<DataFrame> {
        Ok(self.compute()?.head(Some(n)))
    }

    /// Write the materialized view as comma-separated CSV with a header row
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_csv(&self.compute()?, path, b',')
    }

    /// Content fingerprint of the materialized view
    pub fn fingerprint(&self) -> Result<TableFingerprint> {
        self.compute()?.fingerprint()
    }
}

impl From<DataFrame> for EventLogView {
    fn from(table: DataFrame) -> Self {
        Self::new(table)
    }
}
