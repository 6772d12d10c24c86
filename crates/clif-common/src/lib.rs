//! Shared utilities for the CLIF transform crates.
//!
//! - [`polars`](crate::cell_text): `AnyValue` conversions used when reading
//!   input tables cell by cell.
//! - [`datetime`](crate::parse_timestamp): the timestamp formats accepted in
//!   observation, hospitalization and ADT tables.

mod datetime;
mod polars;

pub use datetime::{
    TIMESTAMP_FORMAT, ceil_to_minute, format_date, format_timestamp, hours_between,
    parse_timestamp,
};
pub use polars::{cell_bool, cell_f64, cell_text, parse_bool, parse_f64};
