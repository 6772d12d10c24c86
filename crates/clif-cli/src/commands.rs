use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use clif_cli::output::{write_csv, write_issues};
use clif_core::{run_stitch, run_waterfall};
use clif_ingest::{load_table, read_csv_table};
use clif_model::{CoreConfig, DataIssue};

use crate::cli::{StitchArgs, TablesArgs, TransformArgs, WaterfallArgs};
use crate::types::RunResult;

const RESPIRATORY_SUPPORT: &str = "clif_respiratory_support";
const HOSPITALIZATION: &str = "clif_hospitalization";
const ADT: &str = "clif_adt";

pub const BLOCKS_FILE: &str = "encounter_blocks.csv";
pub const MEMBERS_FILE: &str = "encounter_members.csv";

/// Reads `--config`, applies command-line overrides, and validates the result.
fn resolve_config(args: &TransformArgs) -> Result<CoreConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_json::from_str::<CoreConfig>(&text)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => CoreConfig::default(),
    };
    if let Some(hours) = args.time_interval {
        config = config.with_time_interval(hours);
    }
    if let Some(threads) = args.threads {
        config = config.with_worker_threads(threads);
    }
    config.validate()?;
    debug!(
        time_interval_hours = config.time_interval_hours,
        worker_threads = config.worker_threads,
        "resolved configuration"
    );
    Ok(config)
}

/// Loads a table from an explicit file or by CLIF name from `--tables-dir`.
fn load_input(file: Option<&PathBuf>, tables: &TablesArgs, table: &str) -> Result<DataFrame> {
    let df = match (file, &tables.tables_dir) {
        (Some(path), _) => read_csv_table(path),
        (None, Some(dir)) => load_table(dir, table, &tables.file_type),
        (None, None) => return Err(anyhow!("no input given for {table}")),
    }
    .with_context(|| format!("load {table}"))?;
    debug!(table, rows = df.height(), columns = df.width(), "loaded input");
    Ok(df)
}

fn finish_issues(issues: &[DataIssue], path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            write_issues(issues, path)?;
            Ok(Some(path.to_path_buf()))
        }
        None => Ok(None),
    }
}

pub fn run_waterfall_command(args: &WaterfallArgs) -> Result<RunResult> {
    let span = info_span!("waterfall_command");
    let _guard = span.enter();
    let start = Instant::now();

    let config = resolve_config(&args.transform)?;
    let df = load_input(args.input.as_ref(), &args.tables, RESPIRATORY_SUPPORT)?;
    let mut output = run_waterfall(&df, &config).context("run waterfall")?;
    let written = write_csv("episodes", &mut output.episodes, &args.output)?;
    let issues_path = finish_issues(&output.issues, args.transform.issues.as_deref())?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        "waterfall command complete"
    );
    Ok(RunResult {
        transform: "waterfall",
        partitions: output.hospitalizations,
        partition_label: "hospitalizations",
        excluded: output.excluded,
        tables: vec![written],
        issues: output.issues,
        issues_path,
    })
}

pub fn run_stitch_command(args: &StitchArgs) -> Result<RunResult> {
    let span = info_span!("stitch_command");
    let _guard = span.enter();
    let start = Instant::now();

    let config = resolve_config(&args.transform)?;
    let hospitalizations = load_input(args.hospitalization.as_ref(), &args.tables, HOSPITALIZATION)?;
    let adt = load_input(args.adt.as_ref(), &args.tables, ADT)?;
    let mut output = run_stitch(&hospitalizations, &adt, &config).context("stitch encounters")?;

    let blocks = write_csv(
        "encounter_blocks",
        &mut output.blocks,
        &args.output_dir.join(BLOCKS_FILE),
    )?;
    let members = write_csv(
        "encounter_members",
        &mut output.members,
        &args.output_dir.join(MEMBERS_FILE),
    )?;
    let issues_path = finish_issues(&output.issues, args.transform.issues.as_deref())?;

    info!(
        duration_ms = start.elapsed().as_millis(),
        "stitch command complete"
    );
    Ok(RunResult {
        transform: "stitch",
        partitions: output.patients,
        partition_label: "patients",
        excluded: 0,
        tables: vec![blocks, members],
        issues: output.issues,
        issues_path,
    })
}
