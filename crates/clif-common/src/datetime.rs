//! Timestamp parsing for CLIF tables.
//!
//! CLIF exports are produced by many site-specific ETLs, so the same column
//! can carry `2024-01-05 13:20:00`, `2024-01-05T13:20:00.000Z` or a bare date.
//! Everything is normalised to a naive UTC `NaiveDateTime`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Rendering used for every timestamp column written by the transforms.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parses a timestamp cell, returning `None` when no accepted form matches.
///
/// Offsets are converted to UTC and dropped; a bare date means midnight.
///
/// # Examples
///
/// ```
/// use clif_common::parse_timestamp;
///
/// let ts = parse_timestamp("2024-01-05T13:20:00Z").unwrap();
/// assert_eq!(ts.to_string(), "2024-01-05 13:20:00");
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let mut text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(stripped) = text.strip_suffix(" UTC") {
        text = stripped.trim_end();
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Rounds a timestamp up to the next whole minute (unchanged when already whole).
pub fn ceil_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    if value.second() == 0 && value.nanosecond() == 0 {
        return value;
    }
    let floored = value
        .with_second(0)
        .and_then(|v| v.with_nanosecond(0))
        .unwrap_or(value);
    floored + TimeDelta::minutes(1)
}

/// Formats a timestamp with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Formats the calendar date part of a timestamp.
pub fn format_date(value: NaiveDateTime) -> String {
    value.date().format("%Y-%m-%d").to_string()
}

/// Signed number of hours from `start` to `end`.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn parses_space_and_t_separated() {
        assert_eq!(
            parse_timestamp("2024-03-01 08:15:00"),
            Some(ts("2024-03-01 08:15:00"))
        );
        assert_eq!(
            parse_timestamp("2024-03-01T08:15:00.250"),
            Some(ts("2024-03-01 08:15:00") + TimeDelta::milliseconds(250))
        );
        assert_eq!(
            parse_timestamp("2024-03-01 08:15"),
            Some(ts("2024-03-01 08:15:00"))
        );
    }

    #[test]
    fn converts_offsets_to_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01T08:15:00-05:00"),
            Some(ts("2024-03-01 13:15:00"))
        );
        assert_eq!(
            parse_timestamp("2024-03-01 08:15:00+00:00"),
            Some(ts("2024-03-01 08:15:00"))
        );
        assert_eq!(
            parse_timestamp("2024-03-01 08:15:00 UTC"),
            Some(ts("2024-03-01 08:15:00"))
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_timestamp("2024-03-01"), Some(ts("2024-03-01 00:00:00")));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("03/01/2024 8am"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00:00"), None);
    }

    #[test]
    fn ceil_rounds_up_partial_minutes() {
        assert_eq!(
            ceil_to_minute(ts("2024-03-01 08:15:01")),
            ts("2024-03-01 08:16:00")
        );
        assert_eq!(
            ceil_to_minute(ts("2024-03-01 23:59:30")),
            ts("2024-03-02 00:00:00")
        );
        assert_eq!(
            ceil_to_minute(ts("2024-03-01 08:15:00")),
            ts("2024-03-01 08:15:00")
        );
    }

    #[test]
    fn hours_between_is_signed() {
        let start = ts("2024-03-01 00:00:00");
        let end = ts("2024-03-01 03:30:00");
        assert_eq!(hours_between(start, end), 3.5);
        assert_eq!(hours_between(end, start), -3.5);
    }
}
