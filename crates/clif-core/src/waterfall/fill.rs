//! Categorical segmentation, defaults and numeric fills.

use clif_model::Observation;
use clif_model::vocabulary::{DEVICE_ROOM_AIR, MODE_BLOW_BY, ROOM_AIR_FIO2, is_t_piece};

use super::pipeline::{WaterfallState, WaterfallStep};
use crate::segment::{fill_within_groups, forward_fill, segment};

/// Forward fill of `device_category` over the whole hospitalization.
pub struct DeviceCategoryFillStep;

impl WaterfallStep for DeviceCategoryFillStep {
    fn apply(&self, state: &mut WaterfallState) {
        let values: Vec<Option<String>> = state
            .rows
            .iter()
            .map(|row| row.device_category.clone())
            .collect();
        for (row, value) in state.rows.iter_mut().zip(forward_fill(&values)) {
            row.device_category = value;
        }
    }

    fn step_name(&self) -> &'static str {
        "device_category_fill"
    }
}

/// One level of the device/mode hierarchy.
///
/// Each level is segmented inside the segments of the level above it;
/// device category is segmented over the whole hospitalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLevel {
    DeviceCategory,
    DeviceName,
    ModeCategory,
    ModeName,
}

impl CategoryLevel {
    fn parent_id(self, row: &Observation) -> i64 {
        match self {
            Self::DeviceCategory => 0,
            Self::DeviceName => row.device_cat_id,
            Self::ModeCategory => row.device_id,
            Self::ModeName => row.mode_cat_id,
        }
    }

    fn value(self, row: &Observation) -> &Option<String> {
        match self {
            Self::DeviceCategory => &row.device_category,
            Self::DeviceName => &row.device_name,
            Self::ModeCategory => &row.mode_category,
            Self::ModeName => &row.mode_name,
        }
    }

    fn value_mut(self, row: &mut Observation) -> &mut Option<String> {
        match self {
            Self::DeviceCategory => &mut row.device_category,
            Self::DeviceName => &mut row.device_name,
            Self::ModeCategory => &mut row.mode_category,
            Self::ModeName => &mut row.mode_name,
        }
    }

    fn id_mut(self, row: &mut Observation) -> &mut i64 {
        match self {
            Self::DeviceCategory => &mut row.device_cat_id,
            Self::DeviceName => &mut row.device_id,
            Self::ModeCategory => &mut row.mode_cat_id,
            Self::ModeName => &mut row.mode_name_id,
        }
    }

    /// Device category is only ever forward filled, so the backward fill the
    /// segmenter applies is used for the id alone.
    fn keeps_filled_values(self) -> bool {
        !matches!(self, Self::DeviceCategory)
    }
}

/// Fills one categorical level within its parent segments and assigns its ids.
pub struct SegmentStep {
    level: CategoryLevel,
}

impl SegmentStep {
    pub fn new(level: CategoryLevel) -> Self {
        Self { level }
    }
}

impl WaterfallStep for SegmentStep {
    fn apply(&self, state: &mut WaterfallState) {
        let level = self.level;
        let groups: Vec<i64> = state.rows.iter().map(|row| level.parent_id(row)).collect();
        let values: Vec<Option<String>> = state
            .rows
            .iter()
            .map(|row| level.value(row).clone())
            .collect();
        let segmentation = segment(&groups, &values);

        let keep_values = level.keeps_filled_values();
        for ((row, filled), id) in state
            .rows
            .iter_mut()
            .zip(segmentation.filled)
            .zip(segmentation.segment_ids)
        {
            *level.id_mut(row) = id;
            if keep_values {
                *level.value_mut(row) = filled;
            }
        }
    }

    fn step_name(&self) -> &'static str {
        match self.level {
            CategoryLevel::DeviceCategory => "segment_device_category",
            CategoryLevel::DeviceName => "segment_device_name",
            CategoryLevel::ModeCategory => "segment_mode_category",
            CategoryLevel::ModeName => "segment_mode_name",
        }
    }
}

/// Room air rows without FiO2 breathe 21% oxygen.
pub struct RoomAirFio2Step;

impl WaterfallStep for RoomAirFio2Step {
    fn apply(&self, state: &mut WaterfallState) {
        for row in &mut state.rows {
            if row.fio2_set.is_none() && row.device_category.as_deref() == Some(DEVICE_ROOM_AIR) {
                row.fio2_set = Some(ROOM_AIR_FIO2);
            }
        }
    }

    fn step_name(&self) -> &'static str {
        "room_air_fio2"
    }
}

/// T-piece rows without a mode are blow-by.
pub struct TPieceModeStep;

impl WaterfallStep for TPieceModeStep {
    fn apply(&self, state: &mut WaterfallState) {
        for row in &mut state.rows {
            if row.mode_category.is_none() && row.device_name.as_deref().is_some_and(is_t_piece) {
                row.mode_category = Some(MODE_BLOW_BY.to_string());
            }
        }
    }

    fn step_name(&self) -> &'static str {
        "t_piece_mode"
    }
}

#[derive(Debug, Clone, Copy)]
enum Setting {
    Fio2,
    Lpm,
    Peep,
    RespRateSet,
    RespRateObs,
}

impl Setting {
    const ALL: [Setting; 5] = [
        Setting::Fio2,
        Setting::Lpm,
        Setting::Peep,
        Setting::RespRateSet,
        Setting::RespRateObs,
    ];

    fn value_mut(self, row: &mut Observation) -> &mut Option<f64> {
        match self {
            Self::Fio2 => &mut row.fio2_set,
            Self::Lpm => &mut row.lpm_set,
            Self::Peep => &mut row.peep_set,
            Self::RespRateSet => &mut row.resp_rate_set,
            Self::RespRateObs => &mut row.resp_rate_obs,
        }
    }
}

/// Forward then backward fill of numeric settings within each `mode_name_id`.
pub struct SettingsFillStep;

impl WaterfallStep for SettingsFillStep {
    fn apply(&self, state: &mut WaterfallState) {
        let groups: Vec<i64> = state.rows.iter().map(|row| row.mode_name_id).collect();
        for setting in Setting::ALL {
            let values: Vec<Option<f64>> = state
                .rows
                .iter_mut()
                .map(|row| *setting.value_mut(row))
                .collect();
            for (row, filled) in state
                .rows
                .iter_mut()
                .zip(fill_within_groups(&groups, &values))
            {
                *setting.value_mut(row) = filled;
            }
        }
    }

    fn step_name(&self) -> &'static str {
        "settings_fill"
    }
}

/// Forward fill of `tracheostomy`; a later observation overrides it.
pub struct TracheostomyFillStep;

impl WaterfallStep for TracheostomyFillStep {
    fn apply(&self, state: &mut WaterfallState) {
        let values: Vec<Option<bool>> = state.rows.iter().map(|row| row.tracheostomy).collect();
        for (row, value) in state.rows.iter_mut().zip(forward_fill(&values)) {
            row.tracheostomy = value;
        }
    }

    fn step_name(&self) -> &'static str {
        "tracheostomy_fill"
    }
}
