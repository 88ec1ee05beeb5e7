//! Extension trait for reading event tables stored in Polars DataFrames

use std::fmt;

use polars::prelude::*;

use crate::schema::normalize_timestamps;
use crate::{Error, Result};

const NULL_TAG: u8 = 0;
const VALUE_TAG: u8 = 1;

/// Content digest of a table: column names, dtypes and every cell.
///
/// Two tables with equal fingerprints hold the same rows in the same order,
/// so it serves as a structural cache key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableFingerprint([u8; 32]);

impl TableFingerprint {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex encoding of the digest
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for TableFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TableFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableFingerprint({})", &self.to_hex()[..12])
    }
}

/// Extension trait for event-table access on Polars DataFrames
pub trait EventTableExt {
    /// Whether a column with this name exists
    fn has_column(&self, name: &str) -> bool;

    /// Fail with a missing-columns schema error naming every absent column
    ///
    /// # Arguments
    /// * `columns` - Column names the caller depends on
    fn require_columns(&self, columns: &[&str]) -> Result<()>;

    /// Values of a column rendered as strings (nulls preserved)
    fn string_values(&self, name: &str) -> Result<Vec<Option<String>>>;

    /// Values of a timestamp column as microseconds since the epoch
    ///
    /// String columns are parsed on the fly, temporal columns are cast.
    fn timestamp_values(&self, name: &str) -> Result<Vec<Option<i64>>>;

    /// Content fingerprint used as a cache key
    fn fingerprint(&self) -> Result<TableFingerprint>;
}

impl EventTableExt for DataFrame {
    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_ok()
    }

    fn require_columns(&self, columns: &[&str]) -> Result<()> {
        let mut missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        missing.dedup();
        Err(Error::missing_columns(missing))
    }

    fn string_values(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self
            .column(name)
            .map_err(|_| Error::missing_columns([name]))?;
        let as_str = column.cast(&DataType::String)?;
        let values = as_str
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_owned))
            .collect();
        Ok(values)
    }

    fn timestamp_values(&self, name: &str) -> Result<Vec<Option<i64>>> {
        let column = self
            .column(name)
            .map_err(|_| Error::missing_columns([name]))?;
        let normalized = normalize_timestamps(column)?;
        let physical = normalized.cast(&DataType::Int64)?;
        Ok(physical.i64()?.into_iter().collect())
    }

    fn fingerprint(&self) -> Result<TableFingerprint> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.height() as u64).to_le_bytes());
        for column in self.get_columns() {
            hasher.update(column.name().as_str().as_bytes());
            hasher.update(format!("{:?}", column.dtype()).as_bytes());
            hash_column(&mut hasher, column)?;
        }
        Ok(TableFingerprint(*hasher.finalize().as_bytes()))
    }
}

fn update_cell(hasher: &mut blake3::Hasher, cell: Option<&[u8]>) {
    match cell {
        Some(bytes) => {
            hasher.update(&[VALUE_TAG]);
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        None => {
            hasher.update(&[NULL_TAG]);
        }
    }
}

fn hash_strings(hasher: &mut blake3::Hasher, column: &Column) -> Result<()> {
    for value in column.str()?.into_iter() {
        update_cell(hasher, value.map(str::as_bytes));
    }
    Ok(())
}

fn hash_column(hasher: &mut blake3::Hasher, column: &Column) -> Result<()> {
    let dtype = column.dtype();
    match dtype {
        DataType::String => hash_strings(hasher, column)?,
        DataType::Boolean => {
            for value in column.bool()?.into_iter() {
                update_cell(hasher, value.map(|b| if b { &[1u8][..] } else { &[0u8][..] }));
            }
        }
        DataType::Float32 | DataType::Float64 => {
            let floats = column.cast(&DataType::Float64)?;
            for value in floats.f64()?.into_iter() {
                let bytes = value.map(|v| v.to_bits().to_le_bytes());
                update_cell(hasher, bytes.as_ref().map(|b| &b[..]));
            }
        }
        dt if dt.is_integer() || dt.is_temporal() => {
            let ints = column.cast(&DataType::Int64)?;
            for value in ints.i64()?.into_iter() {
                let bytes = value.map(i64::to_le_bytes);
                update_cell(hasher, bytes.as_ref().map(|b| &b[..]));
            }
        }
        _ => {
            let as_str = column.cast(&DataType::String)?;
            hash_strings(hasher, &as_str)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = df!["CASE_ID" => ["c1", "c2"], "N" => [1i64, 2]].unwrap();
        let b = df!["CASE_ID" => ["c1", "c2"], "N" => [1i64, 2]].unwrap();
        let c = df!["CASE_ID" => ["c1", "c2"], "N" => [1i64, 3]].unwrap();

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }

    #[test]
    fn test_fingerprint_distinguishes_null_from_empty() {
        let a = df!["X" => [Some(""), None]].unwrap();
        let b = df!["X" => [None, Some("")]].unwrap();
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn test_require_columns_names_missing() {
        let table = df!["CASE_ID" => ["c1"]].unwrap();
        let err = table
            .require_columns(&["START_TIMESTAMP", "CASE_ID", "ACTIVITY"])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema error: Missing required columns: ACTIVITY, START_TIMESTAMP"
        );
    }
}
