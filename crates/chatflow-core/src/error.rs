//! Error types for chatflow-miner
//!
//! Provides the error taxonomy shared by every chatflow crate: schema,
//! filter, aggregation and registry failures, plus wrapped polars and IO
//! errors.

use thiserror::Error;

/// Failures detected while checking a table against its expected columns/types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// One or more required columns are absent
    #[error("Missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// A temporal field could not be parsed or has an unsupported type
    #[error("Invalid format in column '{column}': {value}")]
    Format { column: String, value: String },
}

/// A filter's preconditions are violated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Invalid enumerated value or parameter
    #[error("Invalid value for filter '{filter}': {value}")]
    InvalidValue { filter: String, value: String },

    /// Mask is not aligned with the table it was computed for
    #[error("Mask of filter '{filter}' has {got} rows, table has {expected}")]
    MaskLength {
        filter: String,
        expected: usize,
        got: usize,
    },

    /// Declarative filter specification could not be built
    #[error("Invalid filter spec: {0}")]
    InvalidSpec(String),
}

/// Case aggregation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Declarative aggregator specification could not be built
    #[error("Invalid aggregator spec: {0}")]
    InvalidSpec(String),

    /// A lazy aggregation view was computed without an aggregator
    #[error("No aggregator configured")]
    MissingAggregator,
}

/// Process model registry failures
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Lookup or delete of an absent name
    #[error("Unknown name: '{0}'")]
    UnknownName(String),

    /// Duplicate or malformed name, or a placeholder rule violation
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// A placeholder entry was asked to compute or render
    #[error("Entry '{0}' is a placeholder without a process model view")]
    Placeholder(String),

    /// An entry failed while computing or rendering
    #[error("Entry '{name}' failed: {source}")]
    Entry {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl RegistryError {
    /// Create an error for a malformed or duplicate name
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Top level error for every chatflow operation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Model error: {0}")]
    Model(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error naming the columns a table is missing
    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaError::MissingColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
        .into()
    }

    /// Create an error for an unparsable or mistyped column value
    pub fn format(column: impl Into<String>, value: impl Into<String>) -> Self {
        SchemaError::Format {
            column: column.into(),
            value: value.into(),
        }
        .into()
    }

    /// True when this is a missing-columns schema error
    pub fn is_missing_columns(&self) -> bool {
        matches!(self, Error::Schema(SchemaError::MissingColumns { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::missing_columns(["ACTIVITY", "CASE_ID"]);
        assert_eq!(
            err.to_string(),
            "Schema error: Missing required columns: ACTIVITY, CASE_ID"
        );

        let err = Error::format("START_TIMESTAMP", "not-a-date");
        assert_eq!(
            err.to_string(),
            "Schema error: Invalid format in column 'START_TIMESTAMP': not-a-date"
        );

        let err: Error = FilterError::InvalidValue {
            filter: "agent".to_string(),
            value: "bot".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Filter error: Invalid value for filter 'agent': bot");

        let err: Error = RegistryError::UnknownName("dfg".to_string()).into();
        assert_eq!(err.to_string(), "Registry error: Unknown name: 'dfg'");
    }

    #[test]
    fn test_entry_error_keeps_source() {
        let inner = Error::missing_columns(["AGENTE"]);
        let err = RegistryError::Entry {
            name: "model".to_string(),
            source: Box::new(inner),
        };
        assert!(err.to_string().starts_with("Entry 'model' failed"));
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("AGENTE"));
    }

    #[test]
    fn test_is_missing_columns() {
        assert!(Error::missing_columns(["x"]).is_missing_columns());
        assert!(!Error::Model("boom".to_string()).is_missing_columns());
    }

    #[test]
    fn test_error_from_io_error() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => assert!(err.to_string().contains("file not found")),
            _ => panic!("Wrong error type"),
        }
    }
}
