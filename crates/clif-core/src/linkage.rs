//! Linkage of consecutive hospitalizations into blocks.
//!
//! The link relation is a successor chain (stay `i` links only to stay
//! `i + 1`), so block ids are found by propagating each linked stay's id
//! backward from its successor until nothing changes. A chain of N stays
//! settles in at most N passes. Link rules that produce arbitrary edges would
//! need a union-find instead.

use chrono::NaiveDateTime;
use clif_common::hours_between;

/// Admission and discharge of one stay, in admission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayInterval {
    pub admission: NaiveDateTime,
    pub discharge: NaiveDateTime,
}

impl StayInterval {
    pub fn new(admission: NaiveDateTime, discharge: NaiveDateTime) -> Self {
        Self {
            admission,
            discharge,
        }
    }
}

/// Block assignment for a patient's ordered stays.
#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    /// Block id per stay: the 1-based rank of the last stay in its block.
    pub block_ids: Vec<usize>,
    /// Hours from each stay's discharge to the next admission (`len - 1` entries).
    pub gap_hours: Vec<f64>,
    /// Whether each consecutive pair falls below the threshold.
    pub linked: Vec<bool>,
    /// Propagation passes run, including the final pass with no change.
    pub passes: usize,
}

impl Linkage {
    /// Number of distinct blocks.
    pub fn block_count(&self) -> usize {
        if self.block_ids.is_empty() {
            return 0;
        }
        1 + self.block_ids.windows(2).filter(|w| w[0] != w[1]).count()
    }
}

/// Assigns block ids to stays sorted by admission.
///
/// Consecutive stays are linked when the gap from discharge to the next
/// admission is below `threshold_hours`; overlapping stays have a negative
/// gap and are always linked.
pub fn propagate_links(stays: &[StayInterval], threshold_hours: f64) -> Linkage {
    let gap_hours: Vec<f64> = stays
        .windows(2)
        .map(|pair| hours_between(pair[0].discharge, pair[1].admission))
        .collect();
    let linked: Vec<bool> = gap_hours.iter().map(|gap| *gap < threshold_hours).collect();

    let mut block_ids: Vec<usize> = (1..=stays.len()).collect();
    let max_passes = stays.len().max(1);
    let mut passes = 0;
    let mut settled = false;
    while passes < max_passes {
        passes += 1;
        let mut changes = 0;
        // Ascending order reads block_ids[i + 1] before it is rewritten in this pass.
        for i in 0..linked.len() {
            if linked[i] && block_ids[i] != block_ids[i + 1] {
                block_ids[i] = block_ids[i + 1];
                changes += 1;
            }
        }
        if changes == 0 {
            settled = true;
            break;
        }
    }
    if !settled {
        tracing::warn!(stays = stays.len(), passes, "linkage stopped at pass limit");
    }

    Linkage {
        block_ids,
        gap_hours,
        linked,
        passes,
    }
}
