//! Configuration accepted by the transforms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default discharge-to-admission gap (hours) below which stays are linked.
pub const DEFAULT_TIME_INTERVAL_HOURS: f64 = 6.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("time_interval must be a positive number of hours, got {0}")]
    InvalidTimeInterval(f64),
}

/// Parameters passed explicitly into every transform entry point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Linkage threshold in hours; consecutive stays with a smaller gap share a block.
    #[serde(alias = "time_interval")]
    pub time_interval_hours: f64,
    /// Worker threads for per-partition processing (0 = one per CPU).
    pub worker_threads: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            time_interval_hours: DEFAULT_TIME_INTERVAL_HOURS,
            worker_threads: 0,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_interval(mut self, hours: f64) -> Self {
        self.time_interval_hours = hours;
        self
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_interval_hours.is_finite() || self.time_interval_hours <= 0.0 {
            return Err(ConfigError::InvalidTimeInterval(self.time_interval_hours));
        }
        Ok(())
    }
}
