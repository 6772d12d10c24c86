//! Error types for CLIF table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating an input table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input format other than CSV.
    #[error("unsupported file type '{file_type}'; only csv is supported")]
    UnsupportedFileType { file_type: String },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Schema Errors ===
    /// Required column absent, of the wrong type, or holding unusable values.
    ///
    /// Fatal for the whole table.
    #[error("schema error in {table}.{column}: {reason}")]
    Schema {
        table: &'static str,
        column: String,
        reason: String,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn schema(table: &'static str, column: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            table,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that mean the table itself is unusable.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/clif_adt.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/clif_adt.csv");
    }

    #[test]
    fn test_schema_error_display() {
        let err = IngestError::schema("respiratory_support", "peep_set", "column not found");
        assert_eq!(
            err.to_string(),
            "schema error in respiratory_support.peep_set: column not found"
        );
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
        assert!(!ingest_err.is_schema_error());
    }
}
