//! Temporal segmentation of a categorical attribute.
//!
//! Input is an ordered sequence split into groups (contiguous runs of equal
//! group keys). Within each group the value is forward- then backward-filled,
//! and a segment counter advances whenever the filled value changes. The
//! counter is cumulative over the whole sequence and also advances at every
//! group boundary, so applying [`segment`] with the ids of a coarser level as
//! group keys yields a strictly finer partition whose ids keep increasing.
//!
//! A group with no value at all is a single segment of `None`s: missing
//! values compare equal to each other, and the filled values stay `None` so
//! later defaults can still recognise them as unknown.

use std::ops::Range;

/// Filled values and segment ids, one per input position.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation<T> {
    pub filled: Vec<Option<T>>,
    pub segment_ids: Vec<i64>,
}

impl<T> Segmentation<T> {
    /// Number of distinct segments.
    pub fn segment_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for id in &self.segment_ids {
            if last != Some(*id) {
                count += 1;
                last = Some(*id);
            }
        }
        count
    }
}

/// Contiguous runs of equal group keys.
pub fn group_runs<K: PartialEq>(groups: &[K]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for idx in 1..=groups.len() {
        if idx == groups.len() || groups[idx] != groups[start] {
            runs.push(start..idx);
            start = idx;
        }
    }
    runs
}

/// Forward fill over the whole sequence; leading gaps stay `None`.
pub fn forward_fill<T: Clone>(values: &[Option<T>]) -> Vec<Option<T>> {
    let mut last: Option<T> = None;
    values
        .iter()
        .map(|value| {
            if value.is_some() {
                last.clone_from(value);
            }
            last.clone()
        })
        .collect()
}

fn fill_run<T: Clone>(values: &mut [Option<T>]) {
    let mut last: Option<T> = None;
    for value in values.iter_mut() {
        if value.is_some() {
            last.clone_from(value);
        } else if last.is_some() {
            value.clone_from(&last);
        }
    }
    let mut next: Option<T> = None;
    for value in values.iter_mut().rev() {
        if value.is_some() {
            next.clone_from(value);
        } else if next.is_some() {
            value.clone_from(&next);
        }
    }
}

/// Forward then backward fill inside each group.
pub fn fill_within_groups<K: PartialEq, T: Clone>(groups: &[K], values: &[Option<T>]) -> Vec<Option<T>> {
    debug_assert_eq!(groups.len(), values.len());
    let mut filled = values.to_vec();
    for run in group_runs(groups) {
        fill_run(&mut filled[run]);
    }
    filled
}

/// Fills `values` within each group and assigns cumulative segment ids.
///
/// The first position gets id 1.
pub fn segment<K: PartialEq, T: Clone + PartialEq>(groups: &[K], values: &[Option<T>]) -> Segmentation<T> {
    let filled = fill_within_groups(groups, values);
    let mut segment_ids = Vec::with_capacity(filled.len());
    let mut counter = 0i64;
    for run in group_runs(groups) {
        for idx in run.clone() {
            if idx == run.start || filled[idx] != filled[idx - 1] {
                counter += 1;
            }
            segment_ids.push(counter);
        }
    }
    Segmentation {
        filled,
        segment_ids,
    }
}
