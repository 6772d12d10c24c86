//! Runs the `clif` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn clif(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_clif"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn stitch_from_tables_dir() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "clif_hospitalization.csv",
        "patient_id,hospitalization_id,admission_dttm,discharge_dttm,age_at_admission\n\
         P1,H1,2024-01-01 00:00:00,2024-01-02 00:00:00,60\n\
         P1,H2,2024-01-02 03:00:00,2024-01-04 00:00:00,60\n\
         P1,H3,2024-01-04 13:00:00,,60\n",
    );
    write(
        dir.path(),
        "clif_adt.csv",
        "hospitalization_id,in_dttm,out_dttm,location_category,hospital_id\n\
         H1,2024-01-01 00:00:00,2024-01-02 00:00:00,icu,A\n",
    );
    let out = dir.path().join("out");
    let issues = dir.path().join("issues.json");

    let output = clif(&[
        "stitch",
        "--tables-dir",
        arg(dir.path()),
        "--output-dir",
        arg(&out),
        "--issues",
        arg(&issues),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let blocks = std::fs::read_to_string(out.join("encounter_blocks.csv")).unwrap();
    assert!(blocks.starts_with("patient_id,encounter_block,admission_dttm"));
    assert!(blocks.contains("\"H1,H2\""));
    assert!(out.join("encounter_members.csv").exists());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&issues).unwrap()).unwrap();
    assert_eq!(report["summary"]["unlinkable_hospitalization"], 1);
}

#[test]
fn waterfall_with_explicit_files_and_threshold() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "resp.csv",
        "hospitalization_id,recorded_dttm,device_category,device_name,mode_category,mode_name,fio2_set,lpm_set,peep_set,resp_rate_set,resp_rate_obs,tracheostomy\n\
         101,2024-01-01 08:00:00,room air,,,,,,,,,\n",
    );
    let input = dir.path().join("resp.csv");
    let episodes = dir.path().join("episodes.csv");

    let output = clif(&[
        "waterfall",
        "--input",
        arg(&input),
        "--output",
        arg(&episodes),
        "--threads",
        "2",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = std::fs::read_to_string(&episodes).unwrap();
    assert!(text.contains("0.21"));
}

#[test]
fn schema_error_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "resp.csv", "hospitalization_id,recorded_dttm\n101,2024-01-01\n");

    let output = clif(&[
        "waterfall",
        "--input",
        arg(&dir.path().join("resp.csv")),
        "--output",
        arg(&dir.path().join("episodes.csv")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("schema error"));
}

#[test]
fn invalid_time_interval_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = clif(&[
        "stitch",
        "--tables-dir",
        arg(dir.path()),
        "--output-dir",
        arg(dir.path()),
        "--time-interval=-3",
    ]);
    assert_eq!(output.status.code(), Some(1));
}
