//! Ordering, device repair and duplicate handling steps.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use clif_model::vocabulary::{DEVICE_IMV, DEVICE_NIPPV, MECHANICAL_VENTILATOR, is_imv_mode};
use clif_model::{DataIssue, IssueKind, Observation};

use super::pipeline::{WaterfallState, WaterfallStep};

fn promote_to_imv(row: &mut Observation) {
    row.device_category = Some(DEVICE_IMV.to_string());
    row.device_name = Some(MECHANICAL_VENTILATOR.to_string());
}

fn is_imv(row: &Observation) -> bool {
    row.device_category.as_deref() == Some(DEVICE_IMV)
}

/// Stable sort by `recorded_dttm`, ties kept in ingestion order.
pub struct SortByTimeStep;

impl WaterfallStep for SortByTimeStep {
    fn apply(&self, state: &mut WaterfallState) {
        state
            .rows
            .sort_by_key(|row| (row.recorded_dttm, row.ingest_order));

        let ties = state
            .rows
            .windows(2)
            .filter(|pair| pair[0].recorded_dttm == pair[1].recorded_dttm)
            .count();
        if ties > 0 {
            state.issues.push(
                DataIssue::new(
                    IssueKind::OrderingAmbiguity,
                    state.hospitalization_id.clone(),
                    "rows share recorded_dttm; kept ingestion order",
                )
                .with_count(ties),
            );
        }
    }

    fn step_name(&self) -> &'static str {
        "sort_by_time"
    }
}

/// Rows with no device but an invasive-only mode are on a ventilator.
pub struct PatternRepairStep;

impl WaterfallStep for PatternRepairStep {
    fn apply(&self, state: &mut WaterfallState) {
        for row in &mut state.rows {
            if row.device_category.is_none()
                && row.device_name.is_none()
                && row.mode_category.as_deref().is_some_and(is_imv_mode)
            {
                promote_to_imv(row);
            }
        }
    }

    fn step_name(&self) -> &'static str {
        "pattern_repair"
    }
}

/// Rows with no device next to an imv row, carrying vent-only settings.
///
/// Neighbours are read from the rows as left by [`PatternRepairStep`]; a
/// promotion made here does not cascade to the following row.
pub struct NeighborRepairStep;

impl NeighborRepairStep {
    fn has_vent_settings(row: &Observation) -> bool {
        row.resp_rate_set.is_some_and(|v| v > 1.0) && row.peep_set.is_some_and(|v| v > 1.0)
    }
}

impl WaterfallStep for NeighborRepairStep {
    fn apply(&self, state: &mut WaterfallState) {
        let imv_before: Vec<bool> = state.rows.iter().map(is_imv).collect();
        for (idx, row) in state.rows.iter_mut().enumerate() {
            if row.device_category.is_some() || !Self::has_vent_settings(row) {
                continue;
            }
            let previous = idx > 0 && imv_before[idx - 1];
            let next = imv_before.get(idx + 1).copied().unwrap_or(false);
            if previous || next {
                promote_to_imv(row);
            }
        }
    }

    fn step_name(&self) -> &'static str {
        "neighbor_repair"
    }
}

/// Resolves rows sharing a `recorded_dttm`.
///
/// Only keys with more than one row are touched: nippv and device-less rows
/// are dropped first, then rows with no support data, then all but the first
/// remaining row.
pub struct DuplicateRemovalStep;

impl WaterfallStep for DuplicateRemovalStep {
    fn apply(&self, state: &mut WaterfallState) {
        let mut counts: HashMap<NaiveDateTime, usize> = HashMap::new();
        for row in &state.rows {
            *counts.entry(row.recorded_dttm).or_default() += 1;
        }
        let shared = |row: &Observation| counts.get(&row.recorded_dttm).copied().unwrap_or(0) > 1;

        state.rows.retain(|row| {
            !shared(row)
                || !matches!(row.device_category.as_deref(), None | Some(DEVICE_NIPPV))
        });
        state
            .rows
            .retain(|row| !shared(row) || !row.has_no_support_data());

        let mut seen = HashSet::new();
        state.rows.retain(|row| seen.insert(row.recorded_dttm));
    }

    fn step_name(&self) -> &'static str {
        "duplicate_removal"
    }
}

fn same_values(a: &Observation, b: &Observation) -> bool {
    a.hospitalization_id == b.hospitalization_id
        && a.recorded_dttm == b.recorded_dttm
        && a.device_category == b.device_category
        && a.device_name == b.device_name
        && a.mode_category == b.mode_category
        && a.mode_name == b.mode_name
        && a.device_cat_id == b.device_cat_id
        && a.device_id == b.device_id
        && a.mode_cat_id == b.mode_cat_id
        && a.mode_name_id == b.mode_name_id
        && a.fio2_set == b.fio2_set
        && a.lpm_set == b.lpm_set
        && a.peep_set == b.peep_set
        && a.resp_rate_set == b.resp_rate_set
        && a.resp_rate_obs == b.resp_rate_obs
        && a.tracheostomy == b.tracheostomy
}

/// Drops rows identical to their predecessor in every output column.
///
/// Rows are sorted by time, so full duplicates are adjacent.
pub struct DropDuplicateRowsStep;

impl WaterfallStep for DropDuplicateRowsStep {
    fn apply(&self, state: &mut WaterfallState) {
        state.rows.dedup_by(|later, earlier| same_values(earlier, later));
    }

    fn step_name(&self) -> &'static str {
        "drop_duplicate_rows"
    }
}
