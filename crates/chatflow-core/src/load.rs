//! CSV input and output for event tables

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::schema::{verify, IDENTIFIER_COLUMNS};
use crate::{EventTableExt, LoadOptions, Result};

fn csv_options(options: &LoadOptions) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(options.separator))
}

/// Text dtype for every identifier column present in the header.
fn identifier_schema(path: &Path, options: &LoadOptions) -> Result<Schema> {
    let header = csv_options(options)
        .with_n_rows(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    let mut schema = Schema::with_capacity(IDENTIFIER_COLUMNS.len());
    for name in IDENTIFIER_COLUMNS {
        if header.has_column(name) {
            schema.with_column(name.into(), DataType::String);
        }
    }
    Ok(schema)
}

/// Read an event log from CSV, drop the configured columns and validate it.
///
/// Case ids, activities and agents are always read as strings. The returned
/// table has both timestamp columns normalized, see
/// [`verify`](crate::schema::verify).
#[instrument(skip(options), fields(path = %path.as_ref().display()))]
pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> Result<DataFrame> {
    let path = path.as_ref();
    let overwrite = identifier_schema(path, options)?;
    let raw = csv_options(options)
        .with_schema_overwrite(Some(Arc::new(overwrite)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(rows = raw.height(), columns = raw.width(), "csv read");

    let mut table = raw;
    for name in &options.drop_columns {
        if table.has_column(name) {
            table = table.drop(name)?;
        }
    }

    let required: Vec<&str> = options.required_columns.iter().map(String::as_str).collect();
    verify(&table, &required)
}

/// Write a table as CSV with a header row and no index column
#[instrument(skip(table), fields(path = %path.as_ref().display(), rows = table.height()))]
pub fn write_csv(table: &DataFrame, path: impl AsRef<Path>, separator: u8) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    let mut out = table.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(&mut out)?;
    Ok(())
}
