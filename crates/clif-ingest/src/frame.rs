//! Schema checks and typed row extraction from polars frames.
//!
//! Each extractor validates that the required columns exist with a usable
//! dtype and that every non-missing cell converts, returning
//! [`IngestError::Schema`] otherwise. Unparseable timestamps are not schema
//! errors: they are scoped to one hospitalization and handled downstream.

use chrono::NaiveDateTime;
use polars::prelude::{AnyValue, Column, DataFrame, DataType};

use clif_common::{cell_bool, cell_f64, cell_text, parse_timestamp};
use clif_model::columns::{
    ADMISSION_DTTM, ADT_INPUT, DEVICE_CATEGORY, DEVICE_NAME, DISCHARGE_DTTM, FIO2_SET,
    HOSPITAL_ID, HOSPITALIZATION_ID, HOSPITALIZATION_INPUT, IN_DTTM, LOCATION_CATEGORY, LPM_SET,
    MODE_CATEGORY, MODE_NAME, OBSERVATION_INPUT, OUT_DTTM, PATIENT_ID, PEEP_SET, RECORDED_DTTM,
    RESP_RATE_OBS, RESP_RATE_SET, TRACHEOSTOMY,
};
use clif_model::{AdtRecord, DataIssue, Hospitalization, IssueKind, RawObservation};

use crate::error::{IngestError, Result};

pub const OBSERVATION_TABLE: &str = "respiratory_support";
pub const HOSPITALIZATION_TABLE: &str = "hospitalization";
pub const ADT_TABLE: &str = "adt";

/// Spellings of a missing value left behind by upstream exports.
const NULL_TOKENS: &[&str] = &["na", "n/a", "nan", "null", "none"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Numeric,
    Boolean,
    Timestamp,
}

fn is_null_token(text: &str) -> bool {
    NULL_TOKENS
        .iter()
        .any(|token| text.trim().eq_ignore_ascii_case(token))
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

fn dtype_allowed(kind: ColumnKind, dtype: &DataType) -> bool {
    if matches!(dtype, DataType::String | DataType::Null) {
        return true;
    }
    match kind {
        ColumnKind::Text => is_integer(dtype),
        ColumnKind::Numeric => is_numeric(dtype),
        ColumnKind::Boolean => is_numeric(dtype) || matches!(dtype, DataType::Boolean),
        ColumnKind::Timestamp => matches!(dtype, DataType::Datetime(_, _) | DataType::Date),
    }
}

/// Checks that every required column is present, before any row is read.
pub fn require_columns(df: &DataFrame, table: &'static str, required: &[&str]) -> Result<()> {
    for name in required {
        find_column(df, table, name)?;
    }
    Ok(())
}

/// Looks up a column by exact name, then case-insensitively.
fn find_column<'a>(df: &'a DataFrame, table: &'static str, name: &str) -> Result<&'a Column> {
    if let Ok(column) = df.column(name) {
        return Ok(column);
    }
    let matched = df
        .get_column_names()
        .into_iter()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(name))
        .map(|candidate| candidate.to_string());
    match matched {
        Some(actual) => Ok(df.column(&actual)?),
        None => Err(IngestError::schema(table, name, "column not found")),
    }
}

fn typed_column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    name: &str,
    kind: ColumnKind,
) -> Result<&'a Column> {
    let column = find_column(df, table, name)?;
    if !dtype_allowed(kind, column.dtype()) {
        return Err(IngestError::schema(
            table,
            name,
            format!("unexpected dtype {} for a {kind:?} column", column.dtype()),
        ));
    }
    Ok(column)
}

fn present_text(value: AnyValue<'_>) -> Option<String> {
    cell_text(value).filter(|text| !is_null_token(text))
}

fn text_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<Option<String>>> {
    let column = typed_column(df, table, name, ColumnKind::Text)?;
    (0..df.height())
        .map(|idx| Ok(present_text(column.get(idx)?)))
        .collect()
}

/// Like [`text_values`] but every row must carry a value.
fn identifier_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<String>> {
    text_values(df, table, name)?
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            value.ok_or_else(|| IngestError::schema(table, name, format!("missing value at row {idx}")))
        })
        .collect()
}

fn category_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<Option<String>>> {
    Ok(text_values(df, table, name)?
        .into_iter()
        .map(|value| value.map(|text| text.to_lowercase()))
        .collect())
}

fn numeric_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<Option<f64>>> {
    let column = typed_column(df, table, name, ColumnKind::Numeric)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx)?;
        let Some(text) = present_text(value.clone()) else {
            values.push(None);
            continue;
        };
        match cell_f64(value) {
            Some(number) if number.is_nan() => values.push(None),
            Some(number) => values.push(Some(number)),
            None => {
                return Err(IngestError::schema(
                    table,
                    name,
                    format!("non-numeric value '{text}' at row {idx}"),
                ));
            }
        }
    }
    Ok(values)
}

fn bool_values(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<Option<bool>>> {
    let column = typed_column(df, table, name, ColumnKind::Boolean)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx)?;
        let Some(text) = present_text(value.clone()) else {
            values.push(None);
            continue;
        };
        match cell_bool(value) {
            Some(flag) => values.push(Some(flag)),
            None => {
                return Err(IngestError::schema(
                    table,
                    name,
                    format!("non-boolean value '{text}' at row {idx}"),
                ));
            }
        }
    }
    Ok(values)
}

fn timestamp_text(df: &DataFrame, table: &'static str, name: &str) -> Result<Vec<Option<String>>> {
    let column = typed_column(df, table, name, ColumnKind::Timestamp)?;
    (0..df.height())
        .map(|idx| Ok(present_text(column.get(idx)?)))
        .collect()
}

/// Extracts respiratory support rows.
///
/// Device and mode categories are lower-cased; names keep their case.
pub fn observations_from_frame(df: &DataFrame) -> Result<Vec<RawObservation>> {
    let table = OBSERVATION_TABLE;
    require_columns(df, table, OBSERVATION_INPUT)?;

    let hospitalization_ids = identifier_values(df, table, HOSPITALIZATION_ID)?;
    let recorded = timestamp_text(df, table, RECORDED_DTTM)?;
    let device_category = category_values(df, table, DEVICE_CATEGORY)?;
    let device_name = text_values(df, table, DEVICE_NAME)?;
    let mode_category = category_values(df, table, MODE_CATEGORY)?;
    let mode_name = text_values(df, table, MODE_NAME)?;
    let fio2_set = numeric_values(df, table, FIO2_SET)?;
    let lpm_set = numeric_values(df, table, LPM_SET)?;
    let peep_set = numeric_values(df, table, PEEP_SET)?;
    let resp_rate_set = numeric_values(df, table, RESP_RATE_SET)?;
    let resp_rate_obs = numeric_values(df, table, RESP_RATE_OBS)?;
    let tracheostomy = bool_values(df, table, TRACHEOSTOMY)?;

    let rows = hospitalization_ids
        .into_iter()
        .enumerate()
        .map(|(idx, hospitalization_id)| RawObservation {
            hospitalization_id,
            recorded_dttm: recorded[idx].clone().unwrap_or_default(),
            device_category: device_category[idx].clone(),
            device_name: device_name[idx].clone(),
            mode_category: mode_category[idx].clone(),
            mode_name: mode_name[idx].clone(),
            fio2_set: fio2_set[idx],
            lpm_set: lpm_set[idx],
            peep_set: peep_set[idx],
            resp_rate_set: resp_rate_set[idx],
            resp_rate_obs: resp_rate_obs[idx],
            tracheostomy: tracheostomy[idx],
            ingest_order: idx,
        })
        .collect::<Vec<_>>();
    tracing::debug!(table, rows = rows.len(), "extracted observations");
    Ok(rows)
}

/// Parses an optional timestamp cell.
///
/// `Err` carries the issue for a value that is present but unreadable.
fn parse_optional(
    raw: Option<&str>,
    column: &str,
    hospitalization_id: &str,
) -> std::result::Result<Option<NaiveDateTime>, DataIssue> {
    let Some(text) = raw else {
        return Ok(None);
    };
    parse_timestamp(text).map(Some).ok_or_else(|| {
        DataIssue::new(
            IssueKind::TimestampParse,
            hospitalization_id,
            format!("unparseable {column} '{text}'"),
        )
    })
}

/// Extracts hospitalization rows.
///
/// An unreadable admission or discharge time is reported and then treated as
/// missing, which leaves the stay out of linkage.
pub fn hospitalizations_from_frame(
    df: &DataFrame,
) -> Result<(Vec<Hospitalization>, Vec<DataIssue>)> {
    let table = HOSPITALIZATION_TABLE;
    require_columns(df, table, HOSPITALIZATION_INPUT)?;

    let patient_ids = identifier_values(df, table, PATIENT_ID)?;
    let hospitalization_ids = identifier_values(df, table, HOSPITALIZATION_ID)?;
    let admissions = timestamp_text(df, table, ADMISSION_DTTM)?;
    let discharges = timestamp_text(df, table, DISCHARGE_DTTM)?;

    let mut issues = Vec::new();
    let mut rows = Vec::with_capacity(df.height());
    for (idx, (patient_id, hospitalization_id)) in
        patient_ids.into_iter().zip(hospitalization_ids).enumerate()
    {
        let mut parse = |raw: Option<&str>, column: &str| {
            parse_optional(raw, column, &hospitalization_id).unwrap_or_else(|issue| {
                issues.push(issue.with_patient(patient_id.as_str()));
                None
            })
        };
        let admission_dttm = parse(admissions[idx].as_deref(), ADMISSION_DTTM);
        let discharge_dttm = parse(discharges[idx].as_deref(), DISCHARGE_DTTM);
        rows.push(Hospitalization {
            patient_id,
            hospitalization_id,
            admission_dttm,
            discharge_dttm,
            ingest_order: idx,
        });
    }
    tracing::debug!(table, rows = rows.len(), issues = issues.len(), "extracted hospitalizations");
    Ok((rows, issues))
}

/// Extracts ADT transfer rows.
///
/// A record with an unreadable `in_dttm` or `out_dttm` is reported and dropped.
pub fn adt_from_frame(df: &DataFrame) -> Result<(Vec<AdtRecord>, Vec<DataIssue>)> {
    let table = ADT_TABLE;
    require_columns(df, table, ADT_INPUT)?;

    let hospitalization_ids = identifier_values(df, table, HOSPITALIZATION_ID)?;
    let in_times = timestamp_text(df, table, IN_DTTM)?;
    let out_times = timestamp_text(df, table, OUT_DTTM)?;
    let locations = category_values(df, table, LOCATION_CATEGORY)?;
    let hospitals = text_values(df, table, HOSPITAL_ID)?;

    let mut issues = Vec::new();
    let mut rows = Vec::with_capacity(df.height());
    for (idx, hospitalization_id) in hospitalization_ids.into_iter().enumerate() {
        let parsed = parse_optional(in_times[idx].as_deref(), IN_DTTM, &hospitalization_id)
            .and_then(|in_dttm| {
                parse_optional(out_times[idx].as_deref(), OUT_DTTM, &hospitalization_id)
                    .map(|out_dttm| (in_dttm, out_dttm))
            });
        match parsed {
            Ok((in_dttm, out_dttm)) => rows.push(AdtRecord {
                hospitalization_id,
                in_dttm,
                out_dttm,
                location_category: locations[idx].clone(),
                hospital_id: hospitals[idx].clone(),
                ingest_order: idx,
            }),
            Err(issue) => issues.push(issue),
        }
    }
    tracing::debug!(table, rows = rows.len(), issues = issues.len(), "extracted ADT records");
    Ok((rows, issues))
}
