//! Respiratory support waterfall and encounter stitching for CLIF tables.
//!
//! Two batch transforms over in-memory tables:
//!
//! - the waterfall ([`normalize_observations`]) turns sparse respiratory
//!   support observations into filled, segmented device/mode episodes;
//! - the stitcher ([`stitch_encounters`]) merges a patient's hospitalizations
//!   into encounter blocks when discharge-to-admission gaps are short.
//!
//! Both partition their input (by hospitalization and by patient) and run the
//! partitions on a fixed worker pool. Data problems confined to one
//! hospitalization or patient are returned as [`clif_model::DataIssue`]s
//! alongside the output; only schema and infrastructure failures are errors.
//!
//! # Example
//!
//! ```ignore
//! use clif_core::run_waterfall;
//! use clif_model::CoreConfig;
//!
//! let df = clif_ingest::read_csv_table(path)?;
//! let output = run_waterfall(&df, &CoreConfig::default())?;
//! ```

pub mod error;
pub mod frame;
pub mod linkage;
pub mod partition;
pub mod segment;
pub mod stitch;
pub mod waterfall;

pub use error::{CoreError, Result};
pub use frame::{
    LIST_SEPARATOR, StitchFrames, WaterfallFrame, blocks_to_frame, episodes_to_frame,
    members_to_frame, run_stitch, run_waterfall,
};
pub use linkage::{Linkage, StayInterval, propagate_links};
pub use segment::{Segmentation, fill_within_groups, forward_fill, segment};
pub use stitch::{StitchOutput, stitch_encounters};
pub use waterfall::{
    HospitalizationOutcome, WaterfallOutput, WaterfallPipeline, WaterfallStep,
    build_default_waterfall, normalize_hospitalization, normalize_observations,
};
