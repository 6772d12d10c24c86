//! Frame-level runs from CSV input.

use std::path::Path;

use clif_core::{CoreError, run_stitch, run_waterfall};
use clif_ingest::{IngestError, read_csv_table};
use clif_model::columns::{
    DEVICE_CAT_ID, DEVICE_CATEGORY, ENCOUNTER_BLOCK, FIO2_SET, LIST_HOSPITALIZATION_ID,
    RECORDED_DTTM, RECORDED_HOUR, UNLINKABLE,
};
use clif_model::{CoreConfig, IssueKind};
use polars::prelude::DataFrame;
use tempfile::TempDir;

fn table(dir: &Path, name: &str, content: &str) -> DataFrame {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    read_csv_table(&path).unwrap()
}

#[test]
fn waterfall_from_csv() {
    let dir = TempDir::new().unwrap();
    let df = table(
        dir.path(),
        "clif_respiratory_support.csv",
        "hospitalization_id,recorded_dttm,device_category,device_name,mode_category,mode_name,fio2_set,lpm_set,peep_set,resp_rate_set,resp_rate_obs,tracheostomy\n\
         101,2024-01-01 08:00:00,Room Air,,,,,,,,,0\n\
         101,2024-01-01 09:00:20,,,,,,,,,,\n\
         101,2024-01-01 10:00:00,Nasal Cannula,,,,,2,,,,\n\
         102,2024-01-01 08:00:00,IMV,,SIMV,,0.5,,5,14,16,1\n\
         103,yesterday,IMV,,,,,,,,,\n",
    );

    let output = run_waterfall(&df, &CoreConfig::default()).unwrap();
    let episodes = &output.episodes;
    assert_eq!(episodes.height(), 4);
    assert_eq!(output.hospitalizations, 3);
    assert_eq!(output.excluded, 1);
    assert_eq!(output.issues.len(), 1);
    assert_eq!(output.issues[0].kind, IssueKind::TimestampParse);
    assert_eq!(output.issues[0].hospitalization_id, "103");

    let recorded = episodes.column(RECORDED_DTTM).unwrap().str().unwrap();
    assert_eq!(recorded.get(1), Some("2024-01-01 09:01:00"));
    let hours = episodes.column(RECORDED_HOUR).unwrap().i32().unwrap();
    assert_eq!(hours.get(1), Some(9));
    let category = episodes.column(DEVICE_CATEGORY).unwrap().str().unwrap();
    assert_eq!(category.get(1), Some("room air"));
    let fio2 = episodes.column(FIO2_SET).unwrap().f64().unwrap();
    assert_eq!(fio2.get(1), Some(0.21));
    assert_eq!(fio2.get(2), None);
    let ids = episodes.column(DEVICE_CAT_ID).unwrap().i64().unwrap();
    assert_eq!(ids.get(2), Some(2));
    assert_eq!(ids.get(3), Some(1));
}

#[test]
fn waterfall_rejects_bad_schema() {
    let dir = TempDir::new().unwrap();
    let df = table(
        dir.path(),
        "clif_respiratory_support.csv",
        "hospitalization_id,recorded_dttm\n101,2024-01-01 08:00:00\n",
    );

    let err = run_waterfall(&df, &CoreConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::Ingest(IngestError::Schema { .. })
    ));
}

#[test]
fn stitch_from_csv() {
    let dir = TempDir::new().unwrap();
    let hospitalizations = table(
        dir.path(),
        "clif_hospitalization.csv",
        "patient_id,hospitalization_id,admission_dttm,discharge_dttm,age_at_admission\n\
         P1,H1,2024-01-01 00:00:00,2024-01-02 00:00:00,60\n\
         P1,H2,2024-01-02 03:00:00,2024-01-05 00:00:00,60\n\
         P1,H3,2024-02-01 00:00:00,,60\n\
         P2,H4,2024-01-01 00:00:00,2024-01-03 00:00:00,45\n",
    );
    let adt = table(
        dir.path(),
        "clif_adt.csv",
        "hospitalization_id,in_dttm,out_dttm,location_category,hospital_id\n\
         H1,2024-01-01 00:00:00,2024-01-02 00:00:00,icu,A\n\
         H2,2024-01-02 03:00:00,2024-01-05 00:00:00,ward,B\n\
         H4,2024-01-01 00:00:00,bad,icu,A\n",
    );

    let output = run_stitch(&hospitalizations, &adt, &CoreConfig::default()).unwrap();
    assert_eq!(output.patients, 2);

    let blocks = &output.blocks;
    assert_eq!(blocks.height(), 3);
    let numbers = blocks.column(ENCOUNTER_BLOCK).unwrap().i64().unwrap();
    assert_eq!(numbers.into_no_null_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    let lists = blocks.column(LIST_HOSPITALIZATION_ID).unwrap().str().unwrap();
    assert_eq!(lists.get(0), Some("H1,H2"));
    assert_eq!(lists.get(1), Some("H3"));
    let unlinkable = blocks.column(UNLINKABLE).unwrap().bool().unwrap();
    assert_eq!(unlinkable.get(1), Some(true));

    // H1, H2, H3 (no transfers) and H4 (its only transfer was dropped).
    assert_eq!(output.members.height(), 4);

    let kinds: Vec<IssueKind> = output.issues.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![IssueKind::TimestampParse, IssueKind::UnlinkableHospitalization]
    );
}
