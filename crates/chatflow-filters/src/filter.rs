//! Filter contract and boolean combinators

use std::fmt;
use std::sync::Arc;

use chatflow_core::{FilterError, Result};
use polars::prelude::*;

/// A row predicate over an event table.
///
/// Implementations compute a boolean mask aligned by row position with the
/// table they are given; they never modify the table.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Short identifier used in errors and logs
    fn name(&self) -> &str;

    /// Columns the mask reads
    fn required_columns(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Boolean mask with exactly `table.height()` entries
    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked>;

    /// Filtered copy of `table`
    fn apply(&self, table: &DataFrame) -> Result<DataFrame> {
        let mask = ensure_mask(self.name(), self.mask(table)?, table.height())?;
        Ok(table.filter(&mask)?)
    }
}

/// Check that `mask` has `expected` rows and replace nulls with `false`
pub fn ensure_mask(filter: &str, mask: BooleanChunked, expected: usize) -> Result<BooleanChunked> {
    if mask.len() != expected {
        return Err(FilterError::MaskLength {
            filter: filter.to_string(),
            expected,
            got: mask.len(),
        }
        .into());
    }
    if mask.null_count() == 0 {
        return Ok(mask);
    }
    Ok(mask.into_iter().map(|value| value.unwrap_or(false)).collect())
}

/// Mask of `height` rows all set to `value`
pub fn constant_mask(value: bool, height: usize) -> BooleanChunked {
    std::iter::repeat(value).take(height).collect()
}

fn checked_mask(filter: &dyn Filter, table: &DataFrame) -> Result<BooleanChunked> {
    ensure_mask(filter.name(), filter.mask(table)?, table.height())
}

fn union_columns(filters: &[&dyn Filter]) -> Vec<&'static str> {
    let mut columns: Vec<&'static str> = filters
        .iter()
        .flat_map(|filter| filter.required_columns())
        .collect();
    columns.sort_unstable();
    columns.dedup();
    columns
}

/// Rows kept by both filters
#[derive(Debug, Clone)]
pub struct AndFilter {
    left: Arc<dyn Filter>,
    right: Arc<dyn Filter>,
}

impl AndFilter {
    pub fn new(left: Arc<dyn Filter>, right: Arc<dyn Filter>) -> Self {
        Self { left, right }
    }
}

impl Filter for AndFilter {
    fn name(&self) -> &str {
        "and"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        union_columns(&[self.left.as_ref(), self.right.as_ref()])
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        let left = checked_mask(self.left.as_ref(), table)?;
        let right = checked_mask(self.right.as_ref(), table)?;
        Ok(&left & &right)
    }
}

/// Rows kept by either filter
#[derive(Debug, Clone)]
pub struct OrFilter {
    left: Arc<dyn Filter>,
    right: Arc<dyn Filter>,
}

impl OrFilter {
    pub fn new(left: Arc<dyn Filter>, right: Arc<dyn Filter>) -> Self {
        Self { left, right }
    }
}

impl Filter for OrFilter {
    fn name(&self) -> &str {
        "or"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        union_columns(&[self.left.as_ref(), self.right.as_ref()])
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        let left = checked_mask(self.left.as_ref(), table)?;
        let right = checked_mask(self.right.as_ref(), table)?;
        Ok(&left | &right)
    }
}

/// Rows rejected by the inner filter
#[derive(Debug, Clone)]
pub struct NotFilter {
    inner: Arc<dyn Filter>,
}

impl NotFilter {
    pub fn new(inner: Arc<dyn Filter>) -> Self {
        Self { inner }
    }
}

impl Filter for NotFilter {
    fn name(&self) -> &str {
        "not"
    }

    fn required_columns(&self) -> Vec<&'static str> {
        self.inner.required_columns()
    }

    fn mask(&self, table: &DataFrame) -> Result<BooleanChunked> {
        // nulls were filled first, so negation never yields null
        let inner = checked_mask(self.inner.as_ref(), table)?;
        Ok(!&inner)
    }
}

/// Boolean composition for any filter
pub trait FilterExt: Filter + Sized + 'static {
    fn and(self, other: impl Filter + 'static) -> AndFilter {
        AndFilter::new(Arc::new(self), Arc::new(other))
    }

    fn or(self, other: impl Filter + 'static) -> OrFilter {
        OrFilter::new(Arc::new(self), Arc::new(other))
    }

    fn not(self) -> NotFilter {
        NotFilter::new(Arc::new(self))
    }
}

impl<F: Filter + Sized + 'static> FilterExt for F {}
