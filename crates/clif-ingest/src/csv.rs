//! CSV loading for CLIF tables.
//!
//! Every column is read as text; typed conversion happens in [`crate::frame`]
//! so that type problems surface as schema errors naming the column.

use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

/// Reads a CSV file into a DataFrame of string columns.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = metadata.len(), "reading CSV table");

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(df)
}

/// Path of a named CLIF table (`clif_adt`, `clif_hospitalization`, ...) inside a tables directory.
pub fn table_path(tables_dir: &Path, table: &str, file_type: &str) -> Result<PathBuf> {
    if !file_type.eq_ignore_ascii_case("csv") {
        return Err(IngestError::UnsupportedFileType {
            file_type: file_type.to_string(),
        });
    }
    Ok(tables_dir.join(format!("{table}.csv")))
}

/// Loads a named CLIF table from a tables directory.
pub fn load_table(tables_dir: &Path, table: &str, file_type: &str) -> Result<DataFrame> {
    let path = table_path(tables_dir, table, file_type)?;
    let df = read_csv_table(&path)?;
    tracing::info!(
        table,
        path = %path.display(),
        rows = df.height(),
        "loaded table"
    );
    Ok(df)
}
