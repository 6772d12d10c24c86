//! Data model for the CLIF respiratory waterfall and encounter stitching.
//!
//! Row types are plain structs; the `clif-ingest` crate builds them from
//! polars frames and `clif-core` turns them back into frames.

pub mod columns;
pub mod encounter;
pub mod issue;
pub mod observation;
pub mod options;
pub mod vocabulary;

pub use encounter::{AdtRecord, BlockMember, EncounterBlock, Hospitalization};
pub use issue::{DataIssue, IssueKind, IssueSummary};
pub use observation::{EpisodeRow, Observation, RawObservation};
pub use options::{ConfigError, CoreConfig, DEFAULT_TIME_INTERVAL_HOURS};
