//! Per-partition parallel execution on a fixed worker pool.

use std::collections::BTreeMap;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::error::Result;

/// Runs `work` over every partition and returns the results in key order.
///
/// Each partition is moved into exactly one call, so no state is shared
/// between workers. `worker_threads == 0` lets rayon pick one thread per CPU.
pub fn run_partitioned<K, T, R, F>(
    partitions: BTreeMap<K, T>,
    worker_threads: usize,
    work: F,
) -> Result<Vec<R>>
where
    K: Ord + Send,
    T: Send,
    R: Send,
    F: Fn(K, T) -> R + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .thread_name(|idx| format!("clif-worker-{idx}"))
        .build()?;
    tracing::debug!(
        partitions = partitions.len(),
        threads = pool.current_num_threads(),
        "running partitions"
    );

    let items: Vec<(K, T)> = partitions.into_iter().collect();
    Ok(pool.install(|| {
        items
            .into_par_iter()
            .map(|(key, partition)| work(key, partition))
            .collect()
    }))
}
