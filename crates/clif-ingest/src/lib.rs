//! CLIF table ingestion.
//!
//! This crate loads CLIF tables (CSV) into Polars DataFrames, validates them
//! against the input schemas the transforms require, and extracts typed rows.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use clif_ingest::{load_table, observations_from_frame};
//!
//! let df = load_table(Path::new("data/tables"), "clif_respiratory_support", "csv")?;
//! let rows = observations_from_frame(&df)?;
//! ```

mod csv;
mod error;
mod frame;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{load_table, read_csv_table, table_path};

// === Row Extraction ===
pub use frame::{
    ADT_TABLE, HOSPITALIZATION_TABLE, OBSERVATION_TABLE, adt_from_frame,
    hospitalizations_from_frame, observations_from_frame, require_columns,
};
