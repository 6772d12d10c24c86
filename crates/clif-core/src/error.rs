//! Error types for the transforms.
//!
//! Only failures that make a whole run unusable are errors here; problems
//! scoped to one hospitalization or patient are [`clif_model::DataIssue`]s.

use clif_ingest::IngestError;
use clif_model::ConfigError;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Input table could not be read or failed schema validation.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Failed to build an output DataFrame.
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("failed to start worker pool: {message}")]
    ThreadPool { message: String },
}

impl From<rayon::ThreadPoolBuildError> for CoreError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool {
            message: err.to_string(),
        }
    }
}

/// Result type for transform operations.
pub type Result<T> = std::result::Result<T, CoreError>;
