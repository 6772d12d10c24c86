//! Cell conversions for polars `AnyValue`s.
//!
//! CLIF tables are read with every column as text, but frames handed in by
//! library callers may carry integer, float, boolean or temporal columns. The
//! conversions here accept all of those so extraction does not depend on how
//! the frame was built.

use polars::prelude::AnyValue;

/// Trimmed text of a cell; `None` for null and blank cells.
///
/// Whole floats lose their trailing `.0` so an id column read as float
/// (`101.0`) matches the same id read as text (`101`). Temporal values use
/// their `Display` form, which [`crate::parse_timestamp`] accepts.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use clif_common::cell_text;
///
/// assert_eq!(cell_text(AnyValue::Null), None);
/// assert_eq!(cell_text(AnyValue::Float64(101.0)).as_deref(), Some("101"));
/// assert_eq!(cell_text(AnyValue::String(" imv ")).as_deref(), Some("imv"));
/// ```
pub fn cell_text(value: AnyValue<'_>) -> Option<String> {
    let text = match value {
        AnyValue::Null => return None,
        AnyValue::String(s) => s.trim().to_string(),
        AnyValue::StringOwned(s) => s.trim().to_string(),
        AnyValue::Float32(v) => trim_float(f64::from(v)),
        AnyValue::Float64(v) => trim_float(v),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

/// Numeric value of a cell; `None` for null cells and text that is not a number.
pub fn cell_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Boolean value of a cell.
///
/// Numbers are true when non-zero; text goes through [`parse_bool`].
pub fn cell_bool(value: AnyValue<'_>) -> Option<bool> {
    match value {
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_bool(s),
        AnyValue::StringOwned(s) => parse_bool(&s),
        other => cell_f64(other).map(|v| v != 0.0),
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Parses the flag spellings seen in `tracheostomy` columns.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}
