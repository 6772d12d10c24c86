//! End-to-end tests for the respiratory support waterfall.

use clif_common::TIMESTAMP_FORMAT;
use clif_core::{build_default_waterfall, normalize_hospitalization, normalize_observations};
use clif_model::{CoreConfig, EpisodeRow, IssueKind, RawObservation};
use proptest::prelude::*;

fn at(hour: u32) -> String {
    format!("2024-01-{:02} {:02}:00:00", 1 + hour / 24, hour % 24)
}

fn row(hour: u32, order: usize) -> RawObservation {
    RawObservation::new("H1", at(hour)).with_order(order)
}

fn run(rows: Vec<RawObservation>) -> Vec<EpisodeRow> {
    let outcome = normalize_hospitalization("H1", rows, &build_default_waterfall());
    assert!(!outcome.excluded);
    outcome.episodes
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn invasive_mode_promotes_leading_row() {
    let episodes = run(vec![
        row(0, 0).with_mode(Some("assist control-volume control"), None),
        row(1, 1).with_device(Some("imv"), None),
        row(2, 2),
    ]);

    assert_eq!(episodes.len(), 3);
    for episode in &episodes {
        assert_eq!(episode.device_category.as_deref(), Some("imv"));
        assert_eq!(episode.device_name.as_deref(), Some("mechanical ventilator"));
        assert_eq!(episode.device_cat_id, 1);
        assert_eq!(
            episode.mode_category.as_deref(),
            Some("assist control-volume control")
        );
    }
}

#[test]
fn duplicate_timestamp_keeps_definite_device() {
    let episodes = run(vec![
        row(0, 0).with_device(Some("nippv"), Some("V60")),
        row(0, 1).with_device(Some("imv"), Some("Servo-i")),
    ]);

    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].device_category.as_deref(), Some("imv"));
    assert_eq!(episodes[0].device_name.as_deref(), Some("Servo-i"));
}

#[test]
fn room_air_defaults_fio2() {
    let mut with_fio2 = row(2, 2).with_device(Some("nasal cannula"), None);
    with_fio2.fio2_set = Some(0.28);
    let episodes = run(vec![
        row(0, 0).with_device(Some("room air"), None),
        row(1, 1),
        with_fio2,
    ]);

    let fio2: Vec<Option<f64>> = episodes.iter().map(|e| e.fio2_set).collect();
    assert_eq!(fio2, vec![Some(0.21), Some(0.21), Some(0.28)]);
}

#[test]
fn t_piece_without_mode_is_blow_by() {
    let episodes = run(vec![
        row(0, 0).with_device(Some("imv"), Some("Servo-i")).with_mode(Some("simv"), None),
        row(1, 1).with_device(Some("trach collar"), Some("T-Piece")),
    ]);
    assert_eq!(episodes[1].mode_category.as_deref(), Some("blow by"));
    assert_eq!(episodes[1].mode_cat_id, 2);
}

#[test]
fn settings_fill_within_mode_segments() {
    let mut first = row(0, 0)
        .with_device(Some("imv"), Some("Servo-i"))
        .with_mode(Some("simv"), Some("SIMV/PS"));
    first.peep_set = Some(5.0);
    let mut third = row(2, 2)
        .with_device(Some("imv"), Some("Servo-i"))
        .with_mode(Some("pressure support/cpap"), Some("PS"));
    third.peep_set = Some(8.0);
    let episodes = run(vec![first, row(1, 1), third, row(3, 3)]);

    let peep: Vec<Option<f64>> = episodes.iter().map(|e| e.peep_set).collect();
    assert_eq!(peep, vec![Some(5.0), Some(5.0), Some(8.0), Some(8.0)]);
    let mode_ids: Vec<i64> = episodes.iter().map(|e| e.mode_name_id).collect();
    assert_eq!(mode_ids, vec![1, 1, 2, 2]);
}

#[test]
fn recorded_date_and_hour_are_derived() {
    let episodes = run(vec![row(26, 0).with_device(Some("imv"), None)]);
    assert_eq!(episodes[0].recorded_date().to_string(), "2024-01-02");
    assert_eq!(episodes[0].recorded_hour(), 2);
}

#[test]
fn batch_reports_ordering_ambiguity() {
    let rows = vec![
        row(0, 0).with_device(Some("imv"), None),
        row(0, 1).with_device(Some("imv"), None),
    ];
    let output = normalize_observations(rows, &CoreConfig::default()).unwrap();
    assert_eq!(output.episodes.len(), 1);
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.issues[0].kind, IssueKind::OrderingAmbiguity);
    assert_eq!(output.excluded, 0);
}

// ============================================================================
// Properties
// ============================================================================

const CATEGORIES: &[&str] = &["imv", "nippv", "room air", "high flow nc", "nasal cannula"];
const NAMES: &[&str] = &["Servo-i", "PB840", "T-Piece", "V60"];
const MODES: &[&str] = &[
    "assist control-volume control",
    "pressure support/cpap",
    "simv",
    "blow by",
];

fn pick(values: &'static [&'static str]) -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(values).prop_map(str::to_string))
}

fn setting() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0u32..30).prop_map(f64::from))
}

prop_compose! {
    fn observation(max_hour: u32)(
        hour in 1..max_hour,
        device_category in pick(CATEGORIES),
        device_name in pick(NAMES),
        mode_category in pick(MODES),
        mode_name in pick(MODES),
        peep_set in setting(),
        resp_rate_set in setting(),
        fio2_set in prop::option::of(prop::sample::select(vec![0.21, 0.4, 1.0])),
    ) -> RawObservation {
        let mut raw = RawObservation::new("H1", at(hour))
            .with_device(device_category.as_deref(), device_name.as_deref())
            .with_mode(mode_category.as_deref(), mode_name.as_deref());
        raw.peep_set = peep_set;
        raw.resp_rate_set = resp_rate_set;
        raw.fio2_set = fio2_set;
        raw
    }
}

fn with_order(mut rows: Vec<RawObservation>) -> Vec<RawObservation> {
    for (idx, raw) in rows.iter_mut().enumerate() {
        raw.ingest_order = idx;
    }
    rows
}

fn ids(episode: &EpisodeRow) -> [i64; 4] {
    [
        episode.device_cat_id,
        episode.device_id,
        episode.mode_cat_id,
        episode.mode_name_id,
    ]
}

#[test]
fn rerun_of_device_less_leading_row_splits_device_name() {
    let mut ventilated = row(1, 1).with_device(Some("imv"), Some("Servo-i"));
    ventilated.resp_rate_set = Some(14.0);
    ventilated.peep_set = Some(5.0);
    let once = run(vec![row(0, 0), ventilated]);
    assert_eq!(
        once.iter().map(ids).collect::<Vec<_>>(),
        vec![[1, 1, 1, 1], [1, 1, 1, 1]]
    );
    assert_eq!(once[0].device_category, None);
    assert_eq!(once[0].device_name.as_deref(), Some("Servo-i"));
    assert_eq!(once[0].peep_set, Some(5.0));

    let again_input: Vec<RawObservation> = once
        .iter()
        .enumerate()
        .map(|(idx, episode)| episode.to_raw(TIMESTAMP_FORMAT, idx))
        .collect();
    let twice = run(again_input);
    assert_eq!(twice[0].device_category.as_deref(), Some("imv"));
    assert_eq!(
        twice[0].device_name.as_deref(),
        Some("mechanical ventilator")
    );
    assert_eq!(
        twice.iter().map(ids).collect::<Vec<_>>(),
        vec![[1, 1, 1, 1], [1, 2, 2, 2]]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_segment_ids_are_monotone_and_nested(
        rows in prop::collection::vec(observation(48), 0..40),
    ) {
        let episodes = run(with_order(rows));

        for pair in episodes.windows(2) {
            prop_assert!(pair[0].recorded_dttm < pair[1].recorded_dttm);
            let (prev, next) = (ids(&pair[0]), ids(&pair[1]));
            for level in 0..4 {
                prop_assert!(next[level] >= prev[level]);
                prop_assert!(next[level] - prev[level] <= 1);
                if level > 0 && next[level - 1] != prev[level - 1] {
                    prop_assert_ne!(next[level], prev[level]);
                }
            }
        }
        if let Some(first) = episodes.first() {
            prop_assert_eq!(ids(first), [1, 1, 1, 1]);
        }
    }

    #[test]
    fn prop_rerun_keeps_segment_boundaries(
        first_category in prop::sample::select(CATEGORIES),
        rows in prop::collection::vec(observation(48), 0..40),
    ) {
        let mut input = vec![row(0, 0).with_device(Some(first_category), None)];
        input.extend(rows);
        let once = run(with_order(input));

        let again_input: Vec<RawObservation> = once
            .iter()
            .enumerate()
            .map(|(idx, episode)| episode.to_raw(TIMESTAMP_FORMAT, idx))
            .collect();
        let twice = run(again_input);

        prop_assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            prop_assert_eq!(a.recorded_dttm, b.recorded_dttm);
            prop_assert_eq!(ids(a), ids(b));
        }
    }

    #[test]
    fn prop_partitions_are_independent(
        left in prop::collection::vec(observation(24), 1..15),
        right in prop::collection::vec(observation(24), 1..15),
    ) {
        let solo = run(with_order(left.clone()));

        let mut batch: Vec<RawObservation> = left;
        batch.extend(right.into_iter().map(|mut raw| {
            raw.hospitalization_id = "H2".to_string();
            raw
        }));
        let output = normalize_observations(with_order(batch), &CoreConfig::default()).unwrap();
        let from_batch: Vec<EpisodeRow> = output
            .episodes
            .into_iter()
            .filter(|e| e.hospitalization_id == "H1")
            .collect();
        prop_assert_eq!(solo, from_batch);
    }
}
