//! Waterfall normalization of respiratory support observations.
//!
//! Each hospitalization is normalized independently: timestamps are parsed
//! (step 1), then the rows go through the [`WaterfallPipeline`] and are
//! projected to [`EpisodeRow`]s. [`normalize_observations`] runs every
//! hospitalization of a batch on a worker pool.

mod fill;
mod pipeline;
mod repair;

use std::collections::BTreeMap;

use clif_common::{ceil_to_minute, parse_timestamp};
use clif_model::{CoreConfig, DataIssue, EpisodeRow, IssueKind, Observation, RawObservation};

use crate::error::Result;
use crate::partition::run_partitioned;

pub use fill::{
    CategoryLevel, DeviceCategoryFillStep, RoomAirFio2Step, SegmentStep, SettingsFillStep,
    TPieceModeStep, TracheostomyFillStep,
};
pub use pipeline::{WaterfallPipeline, WaterfallState, WaterfallStep, build_default_waterfall};
pub use repair::{
    DropDuplicateRowsStep, DuplicateRemovalStep, NeighborRepairStep, PatternRepairStep,
    SortByTimeStep,
};

/// Result of normalizing one hospitalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HospitalizationOutcome {
    pub episodes: Vec<EpisodeRow>,
    pub issues: Vec<DataIssue>,
    /// Set when the hospitalization was dropped because of a timestamp failure.
    pub excluded: bool,
}

/// Normalized episodes of a whole batch, ordered by hospitalization id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterfallOutput {
    pub episodes: Vec<EpisodeRow>,
    pub issues: Vec<DataIssue>,
    pub hospitalizations: usize,
    pub excluded: usize,
}

fn parse_rows(
    hospitalization_id: &str,
    rows: Vec<RawObservation>,
) -> std::result::Result<Vec<Observation>, DataIssue> {
    let mut parsed = Vec::with_capacity(rows.len());
    let mut failures = 0usize;
    let mut first_failure: Option<String> = None;
    for raw in rows {
        let recorded = parse_timestamp(&raw.recorded_dttm);
        match recorded {
            Some(ts) => parsed.push(Observation::from_raw(raw, ceil_to_minute(ts))),
            None => {
                failures += 1;
                if first_failure.is_none() {
                    first_failure = Some(raw.recorded_dttm);
                }
            }
        }
    }
    match first_failure {
        Some(value) => Err(DataIssue::new(
            IssueKind::TimestampParse,
            hospitalization_id,
            format!("unparseable recorded_dttm {value:?}; hospitalization excluded"),
        )
        .with_count(failures)),
        None => Ok(parsed),
    }
}

/// Runs the waterfall over the rows of one hospitalization.
///
/// Rows may arrive in any order; `ingest_order` breaks timestamp ties. A
/// hospitalization with no rows yields an empty outcome.
pub fn normalize_hospitalization(
    hospitalization_id: &str,
    rows: Vec<RawObservation>,
    pipeline: &WaterfallPipeline,
) -> HospitalizationOutcome {
    if rows.is_empty() {
        return HospitalizationOutcome::default();
    }
    let observations = match parse_rows(hospitalization_id, rows) {
        Ok(observations) => observations,
        Err(issue) => {
            return HospitalizationOutcome {
                episodes: Vec::new(),
                issues: vec![issue],
                excluded: true,
            };
        }
    };

    let mut state = WaterfallState::new(hospitalization_id, observations);
    pipeline.run(&mut state);
    tracing::debug!(
        hospitalization_id,
        rows = state.rows.len(),
        device_segments = state.rows.last().map_or(0, |row| row.device_cat_id),
        "normalized hospitalization"
    );

    HospitalizationOutcome {
        episodes: state.rows.iter().map(EpisodeRow::from).collect(),
        issues: state.issues,
        excluded: false,
    }
}

/// Normalizes every hospitalization in `rows`.
///
/// Rows are partitioned by `hospitalization_id`; partitions run in parallel
/// with no shared state and are reassembled in ascending id order.
pub fn normalize_observations(
    rows: Vec<RawObservation>,
    config: &CoreConfig,
) -> Result<WaterfallOutput> {
    let span = tracing::info_span!("waterfall", rows = rows.len());
    let _guard = span.enter();

    let mut partitions: BTreeMap<String, Vec<RawObservation>> = BTreeMap::new();
    for row in rows {
        partitions
            .entry(row.hospitalization_id.clone())
            .or_default()
            .push(row);
    }

    let pipeline = build_default_waterfall();
    let mut output = WaterfallOutput {
        hospitalizations: partitions.len(),
        ..WaterfallOutput::default()
    };
    let outcomes = run_partitioned(partitions, config.worker_threads, |id, rows| {
        normalize_hospitalization(&id, rows, &pipeline)
    })?;

    for outcome in outcomes {
        if outcome.excluded {
            output.excluded += 1;
        }
        output.episodes.extend(outcome.episodes);
        output.issues.extend(outcome.issues);
    }
    for issue in &output.issues {
        tracing::warn!(
            kind = %issue.kind,
            hospitalization_id = %issue.hospitalization_id,
            count = issue.count,
            "{}",
            issue.detail
        );
    }
    tracing::info!(
        hospitalizations = output.hospitalizations,
        excluded = output.excluded,
        episodes = output.episodes.len(),
        "waterfall complete"
    );
    Ok(output)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use clif_model::{Observation, RawObservation};

    use super::WaterfallState;

    pub(crate) fn hour(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|start| start + TimeDelta::hours(offset))
            .unwrap()
    }

    pub(crate) fn obs(offset: i64, ingest_order: usize) -> Observation {
        Observation::from_raw(
            RawObservation::new("H1", "").with_order(ingest_order),
            hour(offset),
        )
    }

    pub(crate) fn state_of(rows: Vec<Observation>) -> WaterfallState {
        WaterfallState::new("H1", rows)
    }

    pub(crate) trait ObsExt {
        fn device(self, category: &str) -> Self;
        fn device_name(self, name: &str) -> Self;
        fn mode(self, category: &str) -> Self;
        fn settings(self, resp_rate_set: f64, peep_set: f64) -> Self;
        fn fio2(self, value: f64) -> Self;
        fn trach(self, value: bool) -> Self;
    }

    impl ObsExt for Observation {
        fn device(mut self, category: &str) -> Self {
            self.device_category = Some(category.to_string());
            self
        }

        fn device_name(mut self, name: &str) -> Self {
            self.device_name = Some(name.to_string());
            self
        }

        fn mode(mut self, category: &str) -> Self {
            self.mode_category = Some(category.to_string());
            self
        }

        fn settings(mut self, resp_rate_set: f64, peep_set: f64) -> Self {
            self.resp_rate_set = Some(resp_rate_set);
            self.peep_set = Some(peep_set);
            self
        }

        fn fio2(mut self, value: f64) -> Self {
            self.fio2_set = Some(value);
            self
        }

        fn trach(mut self, value: bool) -> Self {
            self.tracheostomy = Some(value);
            self
        }
    }
}
