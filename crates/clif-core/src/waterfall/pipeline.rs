//! Ordered step execution for one hospitalization's observation stream.
//!
//! Each waterfall step implements [`WaterfallStep`] and is run in order by
//! [`WaterfallPipeline`]. Later steps rely on the fills done by earlier ones,
//! so the order returned by [`build_default_waterfall`] is load-bearing.
//!
//! # Standard Waterfall Order
//!
//! 1. **SortByTimeStep** - stable sort by `recorded_dttm`
//! 2. **PatternRepairStep** - promote rows with an invasive mode to imv
//! 3. **NeighborRepairStep** - promote rows adjacent to imv with vent settings
//! 4. **DuplicateRemovalStep** - resolve rows sharing a timestamp
//! 5. **DeviceCategoryFillStep** - forward fill `device_category`
//! 6. **SegmentStep** x4 - device category, device name, mode category, mode name
//! 7. **RoomAirFio2Step** / **TPieceModeStep** - category defaults
//! 8. **SettingsFillStep** - numeric fills within `mode_name_id`
//! 9. **TracheostomyFillStep** - forward fill `tracheostomy`
//! 10. **DropDuplicateRowsStep** - exact duplicate rows

use clif_model::{DataIssue, Observation};

use super::fill::{
    CategoryLevel, DeviceCategoryFillStep, RoomAirFio2Step, SegmentStep, SettingsFillStep,
    TPieceModeStep, TracheostomyFillStep,
};
use super::repair::{
    DropDuplicateRowsStep, DuplicateRemovalStep, NeighborRepairStep, PatternRepairStep,
    SortByTimeStep,
};

/// A single step of the waterfall.
///
/// Steps are total: they never fail, they only rewrite the rows and may
/// record non-fatal issues.
pub trait WaterfallStep: Send + Sync {
    fn apply(&self, state: &mut WaterfallState);

    /// Human-readable name for this step (for logging/debugging).
    fn step_name(&self) -> &'static str;
}

/// Rows of one hospitalization as they move through the waterfall.
#[derive(Debug, Clone, Default)]
pub struct WaterfallState {
    pub hospitalization_id: String,
    pub rows: Vec<Observation>,
    pub issues: Vec<DataIssue>,
    /// Step execution log for debugging.
    pub executed_steps: Vec<&'static str>,
}

impl WaterfallState {
    pub fn new(hospitalization_id: impl Into<String>, rows: Vec<Observation>) -> Self {
        Self {
            hospitalization_id: hospitalization_id.into(),
            rows,
            ..Self::default()
        }
    }
}

/// An ordered pipeline of waterfall steps.
pub struct WaterfallPipeline {
    steps: Vec<Box<dyn WaterfallStep>>,
}

impl Default for WaterfallPipeline {
    fn default() -> Self {
        build_default_waterfall()
    }
}

impl WaterfallPipeline {
    /// Create an empty pipeline.
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the end of the pipeline.
    pub fn add_step(mut self, step: Box<dyn WaterfallStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Execute all steps in order.
    pub fn run(&self, state: &mut WaterfallState) {
        for step in &self.steps {
            let before = state.rows.len();
            step.apply(state);
            if state.rows.len() != before {
                tracing::trace!(
                    hospitalization_id = %state.hospitalization_id,
                    step = step.step_name(),
                    dropped = before - state.rows.len(),
                    "rows removed"
                );
            }
            state.executed_steps.push(step.step_name());
        }
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step_name()).collect()
    }
}

/// Build the standard waterfall.
pub fn build_default_waterfall() -> WaterfallPipeline {
    WaterfallPipeline::empty()
        .add_step(Box::new(SortByTimeStep))
        .add_step(Box::new(PatternRepairStep))
        .add_step(Box::new(NeighborRepairStep))
        .add_step(Box::new(DuplicateRemovalStep))
        .add_step(Box::new(DeviceCategoryFillStep))
        .add_step(Box::new(SegmentStep::new(CategoryLevel::DeviceCategory)))
        .add_step(Box::new(SegmentStep::new(CategoryLevel::DeviceName)))
        .add_step(Box::new(SegmentStep::new(CategoryLevel::ModeCategory)))
        .add_step(Box::new(SegmentStep::new(CategoryLevel::ModeName)))
        .add_step(Box::new(RoomAirFio2Step))
        .add_step(Box::new(TPieceModeStep))
        .add_step(Box::new(SettingsFillStep))
        .add_step(Box::new(TracheostomyFillStep))
        .add_step(Box::new(DropDuplicateRowsStep))
}
