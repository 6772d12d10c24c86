//! DataFrame input and output for the transforms.
//!
//! Output timestamps are rendered as text ([`TIMESTAMP_FORMAT`]) so that the
//! frames write to CSV without a timezone suffix.

use chrono::NaiveDateTime;
use clif_common::{TIMESTAMP_FORMAT, format_date, format_timestamp};
use clif_ingest::{adt_from_frame, hospitalizations_from_frame, observations_from_frame};
use clif_model::columns::{
    ADMISSION_DTTM, DEVICE_CAT_ID, DEVICE_CATEGORY, DEVICE_ID, DEVICE_NAME, DISCHARGE_DTTM,
    ENCOUNTER_BLOCK, FIO2_SET, HOSPITAL_ID, HOSPITALIZATION_ID, IN_DTTM, LIST_HOSPITALIZATION_ID,
    LOCATION_CATEGORY, LPM_SET, MODE_CAT_ID, MODE_CATEGORY, MODE_NAME, MODE_NAME_ID, OUT_DTTM,
    PATIENT_ID, PEEP_SET, RECORDED_DATE, RECORDED_DTTM, RECORDED_HOUR, RESP_RATE_OBS,
    RESP_RATE_SET, TRACHEOSTOMY, UNLINKABLE,
};
use clif_model::{BlockMember, CoreConfig, DataIssue, EncounterBlock, EpisodeRow};
use polars::prelude::{Column, DataFrame, PolarsResult};

use crate::error::Result;
use crate::stitch::stitch_encounters;
use crate::waterfall::normalize_observations;

/// Separator used when rendering `list_hospitalization_id`.
pub const LIST_SEPARATOR: &str = ",";

fn text(values: impl Iterator<Item = Option<NaiveDateTime>>) -> Vec<Option<String>> {
    values.map(|v| v.map(format_timestamp)).collect()
}

/// Builds the episode table in output column order.
pub fn episodes_to_frame(episodes: &[EpisodeRow]) -> PolarsResult<DataFrame> {
    let strings = |f: fn(&EpisodeRow) -> Option<&str>| -> Vec<Option<String>> {
        episodes.iter().map(|e| f(e).map(str::to_string)).collect()
    };
    let ids = |f: fn(&EpisodeRow) -> i64| -> Vec<i64> { episodes.iter().map(f).collect() };
    let numbers = |f: fn(&EpisodeRow) -> Option<f64>| -> Vec<Option<f64>> {
        episodes.iter().map(f).collect()
    };

    DataFrame::new(vec![
        Column::new(
            HOSPITALIZATION_ID.into(),
            episodes
                .iter()
                .map(|e| e.hospitalization_id.clone())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            RECORDED_DTTM.into(),
            episodes
                .iter()
                .map(|e| e.recorded_dttm.format(TIMESTAMP_FORMAT).to_string())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            RECORDED_DATE.into(),
            episodes
                .iter()
                .map(|e| format_date(e.recorded_dttm))
                .collect::<Vec<String>>(),
        ),
        Column::new(
            RECORDED_HOUR.into(),
            episodes
                .iter()
                .map(|e| e.recorded_hour() as i32)
                .collect::<Vec<i32>>(),
        ),
        Column::new(DEVICE_CATEGORY.into(), strings(|e| e.device_category.as_deref())),
        Column::new(DEVICE_NAME.into(), strings(|e| e.device_name.as_deref())),
        Column::new(MODE_CATEGORY.into(), strings(|e| e.mode_category.as_deref())),
        Column::new(MODE_NAME.into(), strings(|e| e.mode_name.as_deref())),
        Column::new(DEVICE_CAT_ID.into(), ids(|e| e.device_cat_id)),
        Column::new(DEVICE_ID.into(), ids(|e| e.device_id)),
        Column::new(MODE_CAT_ID.into(), ids(|e| e.mode_cat_id)),
        Column::new(MODE_NAME_ID.into(), ids(|e| e.mode_name_id)),
        Column::new(FIO2_SET.into(), numbers(|e| e.fio2_set)),
        Column::new(LPM_SET.into(), numbers(|e| e.lpm_set)),
        Column::new(PEEP_SET.into(), numbers(|e| e.peep_set)),
        Column::new(RESP_RATE_SET.into(), numbers(|e| e.resp_rate_set)),
        Column::new(
            TRACHEOSTOMY.into(),
            episodes
                .iter()
                .map(|e| e.tracheostomy)
                .collect::<Vec<Option<bool>>>(),
        ),
        Column::new(RESP_RATE_OBS.into(), numbers(|e| e.resp_rate_obs)),
    ])
}

/// Builds the encounter block table.
pub fn blocks_to_frame(blocks: &[EncounterBlock]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            PATIENT_ID.into(),
            blocks
                .iter()
                .map(|b| b.patient_id.clone())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            ENCOUNTER_BLOCK.into(),
            blocks.iter().map(|b| b.encounter_block).collect::<Vec<i64>>(),
        ),
        Column::new(
            ADMISSION_DTTM.into(),
            text(blocks.iter().map(|b| b.admission_dttm)),
        ),
        Column::new(
            DISCHARGE_DTTM.into(),
            text(blocks.iter().map(|b| b.discharge_dttm)),
        ),
        Column::new(
            HOSPITAL_ID.into(),
            blocks
                .iter()
                .map(|b| b.hospital_id.clone())
                .collect::<Vec<Option<String>>>(),
        ),
        Column::new(
            LIST_HOSPITALIZATION_ID.into(),
            blocks
                .iter()
                .map(|b| b.list_hospitalization_id.join(LIST_SEPARATOR))
                .collect::<Vec<String>>(),
        ),
        Column::new(
            UNLINKABLE.into(),
            blocks.iter().map(|b| b.unlinkable).collect::<Vec<bool>>(),
        ),
    ])
}

/// Builds the block membership table.
pub fn members_to_frame(members: &[BlockMember]) -> PolarsResult<DataFrame> {
    let strings = |f: fn(&BlockMember) -> Option<&str>| -> Vec<Option<String>> {
        members.iter().map(|m| f(m).map(str::to_string)).collect()
    };

    DataFrame::new(vec![
        Column::new(PATIENT_ID.into(), strings(|m| Some(m.patient_id.as_str()))),
        Column::new(
            HOSPITALIZATION_ID.into(),
            strings(|m| Some(m.hospitalization_id.as_str())),
        ),
        Column::new(
            ENCOUNTER_BLOCK.into(),
            members.iter().map(|m| m.encounter_block).collect::<Vec<i64>>(),
        ),
        Column::new(
            LOCATION_CATEGORY.into(),
            strings(|m| m.location_category.as_deref()),
        ),
        Column::new(IN_DTTM.into(), text(members.iter().map(|m| m.in_dttm))),
        Column::new(OUT_DTTM.into(), text(members.iter().map(|m| m.out_dttm))),
        Column::new(
            ADMISSION_DTTM.into(),
            text(members.iter().map(|m| m.admission_dttm)),
        ),
        Column::new(
            DISCHARGE_DTTM.into(),
            text(members.iter().map(|m| m.discharge_dttm)),
        ),
        Column::new(HOSPITAL_ID.into(), strings(|m| m.hospital_id.as_deref())),
        Column::new(
            LIST_HOSPITALIZATION_ID.into(),
            members
                .iter()
                .map(|m| m.list_hospitalization_id.join(LIST_SEPARATOR))
                .collect::<Vec<String>>(),
        ),
    ])
}

/// Episode table and issues from a respiratory support frame.
#[derive(Debug, Clone)]
pub struct WaterfallFrame {
    pub episodes: DataFrame,
    pub issues: Vec<DataIssue>,
    pub hospitalizations: usize,
    pub excluded: usize,
}

/// Validates a respiratory support frame and runs the waterfall over it.
pub fn run_waterfall(observations: &DataFrame, config: &CoreConfig) -> Result<WaterfallFrame> {
    let rows = observations_from_frame(observations)?;
    let output = normalize_observations(rows, config)?;
    Ok(WaterfallFrame {
        episodes: episodes_to_frame(&output.episodes)?,
        issues: output.issues,
        hospitalizations: output.hospitalizations,
        excluded: output.excluded,
    })
}

/// Block and membership tables and issues from hospitalization and ADT frames.
#[derive(Debug, Clone)]
pub struct StitchFrames {
    pub blocks: DataFrame,
    pub members: DataFrame,
    pub issues: Vec<DataIssue>,
    pub patients: usize,
}

/// Validates hospitalization and ADT frames and stitches encounters.
///
/// Timestamp issues found while reading the tables come first in `issues`.
pub fn run_stitch(
    hospitalizations: &DataFrame,
    adt: &DataFrame,
    config: &CoreConfig,
) -> Result<StitchFrames> {
    let (stays, mut issues) = hospitalizations_from_frame(hospitalizations)?;
    let (transfers, adt_issues) = adt_from_frame(adt)?;
    issues.extend(adt_issues);
    for issue in &issues {
        tracing::warn!(
            kind = %issue.kind,
            hospitalization_id = %issue.hospitalization_id,
            patient_id = issue.patient_id.as_deref().unwrap_or_default(),
            "{}",
            issue.detail
        );
    }

    let output = stitch_encounters(stays, transfers, config)?;
    issues.extend(output.issues);
    Ok(StitchFrames {
        blocks: blocks_to_frame(&output.blocks)?,
        members: members_to_frame(&output.members)?,
        issues,
        patients: output.patients,
    })
}
