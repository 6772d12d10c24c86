//! Writing transform outputs: CSV tables with a SHA-256 fingerprint and the
//! JSON issue report.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clif_model::{DataIssue, IssueSummary};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use sha2::{Digest, Sha256};

/// Buffer size for reading files during checksum computation.
const BUFFER_SIZE: usize = 65536;

/// A table written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenTable {
    pub table: &'static str,
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the written file; identical input gives identical output.
    pub sha256: String,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Writes a frame as CSV with a header row.
pub fn write_csv(table: &'static str, df: &mut DataFrame, path: &Path) -> Result<WrittenTable> {
    ensure_parent(path)?;
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write {table} to {}", path.display()))?;

    let sha256 = file_sha256(path)?;
    tracing::info!(table, path = %path.display(), rows = df.height(), %sha256, "wrote table");
    Ok(WrittenTable {
        table,
        path: path.to_path_buf(),
        rows: df.height(),
        sha256,
    })
}

/// Compute the SHA-256 of a file as lowercase hex.
pub fn file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Renders the issue report: counts per kind followed by every issue.
pub fn issue_report(issues: &[DataIssue]) -> serde_json::Value {
    serde_json::json!({
        "summary": IssueSummary::from_issues(issues),
        "issues": issues,
    })
}

/// Writes the issue report as pretty JSON.
pub fn write_issues(issues: &[DataIssue], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let text = serde_json::to_string_pretty(&issue_report(issues)).context("serialize issues")?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), issues = issues.len(), "wrote issue report");
    Ok(())
}
