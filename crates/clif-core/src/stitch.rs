//! Encounter stitching: linkage per patient, block aggregation, ADT rejoin.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use clif_model::{
    AdtRecord, BlockMember, CoreConfig, DataIssue, EncounterBlock, Hospitalization, IssueKind,
};

use crate::error::Result;
use crate::linkage::{StayInterval, propagate_links};
use crate::partition::run_partitioned;

/// Encounter blocks of a whole batch.
///
/// Blocks are numbered from 1 across the batch: patients in ascending
/// `patient_id`, each patient's linked blocks in admission order, then its
/// unlinkable stays in ingestion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StitchOutput {
    pub blocks: Vec<EncounterBlock>,
    pub members: Vec<BlockMember>,
    pub issues: Vec<DataIssue>,
    pub patients: usize,
}

#[derive(Debug, Default)]
struct PatientPartition {
    stays: Vec<Hospitalization>,
    transfers: Vec<AdtRecord>,
}

#[derive(Debug, Default)]
struct PatientBlocks {
    blocks: Vec<EncounterBlock>,
    members: Vec<BlockMember>,
    issues: Vec<DataIssue>,
}

type TransferKey = (Option<NaiveDateTime>, Option<NaiveDateTime>, Option<String>);

fn unlinkable_issue(patient_id: &str, stay: &Hospitalization) -> DataIssue {
    let missing = match (stay.admission_dttm, stay.discharge_dttm) {
        (None, None) => "admission_dttm and discharge_dttm",
        (None, Some(_)) => "admission_dttm",
        _ => "discharge_dttm",
    };
    DataIssue::new(
        IssueKind::UnlinkableHospitalization,
        stay.hospitalization_id.clone(),
        format!("missing {missing}; kept as its own encounter block"),
    )
    .with_patient(patient_id)
}

/// Splits a patient's stays into blocks of members in position order.
///
/// Returns the groups and how many of them came from linkage.
fn link_stays(
    patient_id: &str,
    stays: Vec<Hospitalization>,
    threshold_hours: f64,
    issues: &mut Vec<DataIssue>,
) -> (Vec<Vec<Hospitalization>>, usize) {
    let (mut linkable, unlinkable): (Vec<_>, Vec<_>) =
        stays.into_iter().partition(Hospitalization::is_linkable);
    issues.extend(unlinkable.iter().map(|stay| unlinkable_issue(patient_id, stay)));

    linkable.sort_by_key(|stay| (stay.admission_dttm, stay.ingest_order));
    let tied: Vec<&Hospitalization> = linkable
        .windows(2)
        .filter(|pair| pair[0].admission_dttm == pair[1].admission_dttm)
        .map(|pair| &pair[1])
        .collect();
    if let Some(first) = tied.first() {
        issues.push(
            DataIssue::new(
                IssueKind::OrderingAmbiguity,
                first.hospitalization_id.clone(),
                "hospitalizations share admission_dttm; kept ingestion order",
            )
            .with_patient(patient_id)
            .with_count(tied.len()),
        );
    }

    let intervals: Vec<StayInterval> = linkable
        .iter()
        .filter_map(|stay| Some(StayInterval::new(stay.admission_dttm?, stay.discharge_dttm?)))
        .collect();
    let linkage = propagate_links(&intervals, threshold_hours);
    tracing::trace!(
        patient_id,
        stays = intervals.len(),
        blocks = linkage.block_count(),
        passes = linkage.passes,
        "linked stays"
    );

    let mut groups: Vec<Vec<Hospitalization>> = Vec::new();
    let mut current = None;
    for (stay, block_id) in linkable.into_iter().zip(linkage.block_ids) {
        if current != Some(block_id) {
            groups.push(Vec::new());
            current = Some(block_id);
        }
        if let Some(group) = groups.last_mut() {
            group.push(stay);
        }
    }
    let linked_groups = groups.len();
    groups.extend(unlinkable.into_iter().map(|stay| vec![stay]));
    (groups, linked_groups)
}

fn aggregate_block(
    patient_id: &str,
    encounter_block: i64,
    members: &[Hospitalization],
    transfers: &HashMap<String, Vec<AdtRecord>>,
    unlinkable: bool,
) -> EncounterBlock {
    let admission_dttm = members.iter().filter_map(|m| m.admission_dttm).min();
    let discharge_dttm = members.iter().filter_map(|m| m.discharge_dttm).max();
    let hospital_id = members
        .iter()
        .filter_map(|m| transfers.get(&m.hospitalization_id))
        .flatten()
        .filter_map(|record| record.hospital_id.clone())
        .last();

    let mut list_hospitalization_id: Vec<String> =
        members.iter().map(|m| m.hospitalization_id.clone()).collect();
    list_hospitalization_id.sort();
    list_hospitalization_id.dedup();

    EncounterBlock {
        patient_id: patient_id.to_string(),
        encounter_block,
        admission_dttm,
        discharge_dttm,
        hospital_id,
        list_hospitalization_id,
        unlinkable,
    }
}

fn member_rows(
    block: &EncounterBlock,
    members: &[Hospitalization],
    transfers: &HashMap<String, Vec<AdtRecord>>,
) -> Vec<BlockMember> {
    let row = |hospitalization_id: &str, record: Option<&AdtRecord>| BlockMember {
        patient_id: block.patient_id.clone(),
        hospitalization_id: hospitalization_id.to_string(),
        encounter_block: block.encounter_block,
        location_category: record.and_then(|r| r.location_category.clone()),
        in_dttm: record.and_then(|r| r.in_dttm),
        out_dttm: record.and_then(|r| r.out_dttm),
        admission_dttm: block.admission_dttm,
        discharge_dttm: block.discharge_dttm,
        hospital_id: block.hospital_id.clone(),
        list_hospitalization_id: block.list_hospitalization_id.clone(),
    };

    let mut rows = Vec::new();
    let mut seen: HashSet<TransferKey> = HashSet::new();
    for member in members {
        match transfers.get(&member.hospitalization_id) {
            Some(records) if !records.is_empty() => {
                for record in records {
                    let key = (record.in_dttm, record.out_dttm, record.location_category.clone());
                    if seen.insert(key) {
                        rows.push(row(&member.hospitalization_id, Some(record)));
                    }
                }
            }
            _ => rows.push(row(&member.hospitalization_id, None)),
        }
    }
    rows
}

fn stitch_patient(patient_id: &str, partition: PatientPartition, threshold_hours: f64) -> PatientBlocks {
    let PatientPartition {
        mut stays,
        transfers,
    } = partition;
    stays.sort_by_key(|stay| stay.ingest_order);

    let mut by_stay: HashMap<String, Vec<AdtRecord>> = HashMap::new();
    for record in transfers {
        by_stay
            .entry(record.hospitalization_id.clone())
            .or_default()
            .push(record);
    }
    for records in by_stay.values_mut() {
        records.sort_by_key(|record| (record.in_dttm, record.ingest_order));
    }

    let mut out = PatientBlocks::default();
    let (groups, linked_groups) = link_stays(patient_id, stays, threshold_hours, &mut out.issues);
    for (idx, members) in groups.iter().enumerate() {
        let block = aggregate_block(
            patient_id,
            idx as i64 + 1,
            members,
            &by_stay,
            idx >= linked_groups,
        );
        out.members.extend(member_rows(&block, members, &by_stay));
        out.blocks.push(block);
    }
    out
}

/// Builds encounter blocks and the block membership table.
///
/// ADT records whose hospitalization is not in `hospitalizations` are ignored.
pub fn stitch_encounters(
    hospitalizations: Vec<Hospitalization>,
    adt: Vec<AdtRecord>,
    config: &CoreConfig,
) -> Result<StitchOutput> {
    config.validate()?;
    let span = tracing::info_span!(
        "stitch",
        hospitalizations = hospitalizations.len(),
        adt = adt.len()
    );
    let _guard = span.enter();

    let mut patient_of: HashMap<String, String> = HashMap::new();
    let mut partitions: BTreeMap<String, PatientPartition> = BTreeMap::new();
    for stay in hospitalizations {
        patient_of
            .entry(stay.hospitalization_id.clone())
            .or_insert_with(|| stay.patient_id.clone());
        partitions
            .entry(stay.patient_id.clone())
            .or_default()
            .stays
            .push(stay);
    }

    let mut orphaned = 0usize;
    for record in adt {
        let partition = patient_of
            .get(&record.hospitalization_id)
            .and_then(|patient_id| partitions.get_mut(patient_id));
        match partition {
            Some(partition) => partition.transfers.push(record),
            None => orphaned += 1,
        }
    }
    if orphaned > 0 {
        tracing::debug!(orphaned, "ignored ADT rows for unknown hospitalizations");
    }

    let threshold_hours = config.time_interval_hours;
    let mut output = StitchOutput {
        patients: partitions.len(),
        ..StitchOutput::default()
    };
    let results = run_partitioned(partitions, config.worker_threads, |patient_id, partition| {
        stitch_patient(&patient_id, partition, threshold_hours)
    })?;

    let mut offset = 0i64;
    for mut result in results {
        for block in &mut result.blocks {
            block.encounter_block += offset;
        }
        for member in &mut result.members {
            member.encounter_block += offset;
        }
        offset += result.blocks.len() as i64;
        output.blocks.extend(result.blocks);
        output.members.extend(result.members);
        output.issues.extend(result.issues);
    }

    for issue in &output.issues {
        tracing::warn!(
            kind = %issue.kind,
            hospitalization_id = %issue.hospitalization_id,
            patient_id = issue.patient_id.as_deref().unwrap_or_default(),
            "{}",
            issue.detail
        );
    }
    tracing::info!(
        patients = output.patients,
        blocks = output.blocks.len(),
        members = output.members.len(),
        threshold_hours,
        "stitching complete"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn at(hours: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
            + TimeDelta::hours(hours)
    }

    fn stay(patient: &str, id: &str, admit: i64, discharge: i64, order: usize) -> Hospitalization {
        Hospitalization::new(patient, id, Some(at(admit)), Some(at(discharge))).with_order(order)
    }

    #[test]
    fn ties_on_admission_are_reported() {
        let mut issues = Vec::new();
        let (groups, linked) = link_stays(
            "P1",
            vec![stay("P1", "B", 0, 10, 1), stay("P1", "A", 0, 12, 0)],
            6.0,
            &mut issues,
        );
        assert_eq!(linked, 1);
        let ids: Vec<&str> = groups[0].iter().map(|s| s.hospitalization_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::OrderingAmbiguity);
        assert_eq!(issues[0].hospitalization_id, "B");
    }

    #[test]
    fn hospital_comes_from_last_member() {
        let members = vec![stay("P1", "H1", 0, 10, 0), stay("P1", "H2", 12, 20, 1)];
        let mut transfers = HashMap::new();
        transfers.insert(
            "H1".to_string(),
            vec![AdtRecord::new("H1", Some(at(0)), Some(at(10))).with_location("icu", "A")],
        );
        transfers.insert(
            "H2".to_string(),
            vec![
                AdtRecord::new("H2", Some(at(12)), Some(at(15))).with_location("ward", "B"),
                AdtRecord::new("H2", Some(at(15)), Some(at(20))),
            ],
        );

        let block = aggregate_block("P1", 1, &members, &transfers, false);
        assert_eq!(block.hospital_id.as_deref(), Some("B"));
        assert_eq!(block.admission_dttm, Some(at(0)));
        assert_eq!(block.discharge_dttm, Some(at(20)));
        assert_eq!(block.list_hospitalization_id, vec!["H1", "H2"]);
    }

    #[test]
    fn member_rows_dedupe_transfers_and_keep_stays_without_adt() {
        let members = vec![stay("P1", "H1", 0, 10, 0), stay("P1", "H2", 12, 20, 1)];
        let record = AdtRecord::new("H1", Some(at(0)), Some(at(10))).with_location("icu", "A");
        let mut transfers = HashMap::new();
        transfers.insert("H1".to_string(), vec![record.clone(), record.with_order(1)]);

        let block = aggregate_block("P1", 1, &members, &transfers, false);
        let rows = member_rows(&block, &members, &transfers);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location_category.as_deref(), Some("icu"));
        assert_eq!(rows[1].hospitalization_id, "H2");
        assert_eq!(rows[1].in_dttm, None);
        assert_eq!(rows[1].hospital_id.as_deref(), Some("A"));
    }

    #[test]
    fn numbering_is_global_and_ordered_by_patient() {
        let stays = vec![
            stay("P2", "H3", 0, 10, 0),
            stay("P1", "H1", 0, 10, 1),
            stay("P1", "H2", 100, 110, 2),
            Hospitalization::new("P1", "H0", Some(at(50)), None).with_order(3),
        ];
        let output = stitch_encounters(stays, Vec::new(), &CoreConfig::default()).unwrap();

        let numbering: Vec<(&str, i64, bool)> = output
            .blocks
            .iter()
            .map(|b| (b.list_hospitalization_id[0].as_str(), b.encounter_block, b.unlinkable))
            .collect();
        assert_eq!(
            numbering,
            vec![("H1", 1, false), ("H2", 2, false), ("H0", 3, true), ("H3", 4, false)]
        );
        assert_eq!(output.patients, 2);
        assert_eq!(output.members.len(), 4);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let config = CoreConfig::default().with_time_interval(0.0);
        assert!(stitch_encounters(Vec::new(), Vec::new(), &config).is_err());
    }
}
