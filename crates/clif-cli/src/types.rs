use std::path::PathBuf;

use clif_cli::output::WrittenTable;
use clif_model::DataIssue;

#[derive(Debug)]
pub struct RunResult {
    pub transform: &'static str,
    /// Partitions processed and what they are ("hospitalizations", "patients").
    pub partitions: usize,
    pub partition_label: &'static str,
    /// Hospitalizations dropped from the output.
    pub excluded: usize,
    pub tables: Vec<WrittenTable>,
    pub issues: Vec<DataIssue>,
    pub issues_path: Option<PathBuf>,
}
