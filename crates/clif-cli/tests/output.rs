//! Tests for writing tables and issue reports.

use clif_cli::output::{file_sha256, issue_report, write_csv, write_issues};
use clif_model::{DataIssue, IssueKind};
use polars::prelude::{Column, DataFrame};
use tempfile::TempDir;

fn blocks_df() -> DataFrame {
    DataFrame::new(vec![
        Column::new("patient_id".into(), vec!["P1", "P2"]),
        Column::new("encounter_block".into(), vec![1i64, 2]),
    ])
    .unwrap()
}

#[test]
fn write_csv_creates_directories_and_fingerprints() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("blocks.csv");
    let mut df = blocks_df();

    let written = write_csv("encounter_blocks", &mut df, &path).unwrap();
    assert_eq!(written.rows, 2);
    assert_eq!(written.sha256.len(), 64);
    assert_eq!(written.sha256, file_sha256(&path).unwrap());

    let text = std::fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text, @r"
    patient_id,encounter_block
    P1,1
    P2,2
    ");
}

#[test]
fn identical_frames_have_identical_fingerprints() {
    let dir = TempDir::new().unwrap();
    let first = write_csv("a", &mut blocks_df(), &dir.path().join("a.csv")).unwrap();
    let second = write_csv("b", &mut blocks_df(), &dir.path().join("b.csv")).unwrap();
    assert_eq!(first.sha256, second.sha256);
}

#[test]
fn issue_report_counts_by_kind() {
    let issues = vec![
        DataIssue::new(IssueKind::TimestampParse, "H1", "unparseable recorded_dttm").with_count(2),
        DataIssue::new(IssueKind::UnlinkableHospitalization, "H2", "missing discharge_dttm")
            .with_patient("P1"),
    ];
    let report = issue_report(&issues);

    assert_eq!(report["summary"]["timestamp_parse"], 1);
    assert_eq!(report["summary"]["unlinkable_hospitalization"], 1);
    assert_eq!(report["summary"]["ordering_ambiguity"], 0);
    assert_eq!(report["issues"][0]["count"], 2);
    assert_eq!(report["issues"][1]["patient_id"], "P1");

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("issues.json");
    write_issues(&issues, &path).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, report);
}
