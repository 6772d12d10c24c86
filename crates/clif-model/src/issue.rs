//! Non-fatal data-quality issues reported alongside transform output.
//!
//! Issues scoped to one hospitalization or patient never abort a batch; they
//! are collected here so callers can decide whether to exclude the affected
//! rows downstream.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A timestamp could not be parsed; the hospitalization (or record) was excluded.
    TimestampParse,
    /// Rows shared a sort key and were ordered by ingestion position.
    OrderingAmbiguity,
    /// Missing admission or discharge time; the stay became its own block.
    UnlinkableHospitalization,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimestampParse => "timestamp_parse",
            Self::OrderingAmbiguity => "ordering_ambiguity",
            Self::UnlinkableHospitalization => "unlinkable_hospitalization",
        }
    }

    /// Whether the affected hospitalization was dropped from the output.
    pub fn excludes_rows(self) -> bool {
        matches!(self, Self::TimestampParse)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data-quality issue tied to one hospitalization and, when known, its patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIssue {
    pub kind: IssueKind,
    pub hospitalization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub detail: String,
    /// Number of rows the issue covers.
    pub count: usize,
}

impl DataIssue {
    pub fn new(kind: IssueKind, hospitalization_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            hospitalization_id: hospitalization_id.into(),
            patient_id: None,
            detail: detail.into(),
            count: 1,
        }
    }

    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] hospitalization {}", self.kind, self.hospitalization_id)?;
        if let Some(patient_id) = &self.patient_id {
            write!(f, " (patient {patient_id})")?;
        }
        write!(f, ": {}", self.detail)?;
        if self.count > 1 {
            write!(f, " x{}", self.count)?;
        }
        Ok(())
    }
}

/// Issue counts per kind, for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub timestamp_parse: usize,
    pub ordering_ambiguity: usize,
    pub unlinkable_hospitalization: usize,
}

impl IssueSummary {
    pub fn from_issues(issues: &[DataIssue]) -> Self {
        let mut summary = Self::default();
        for issue in issues {
            match issue.kind {
                IssueKind::TimestampParse => summary.timestamp_parse += 1,
                IssueKind::OrderingAmbiguity => summary.ordering_ambiguity += 1,
                IssueKind::UnlinkableHospitalization => summary.unlinkable_hospitalization += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.timestamp_parse + self.ordering_ambiguity + self.unlinkable_hospitalization
    }
}
