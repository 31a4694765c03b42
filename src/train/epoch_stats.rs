use serde::{Deserialize, Serialize};

use crate::metrics::MetricLogs;

/// Metrics of one completed training epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Running metric values at the end of the epoch.
    pub logs: MetricLogs,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Everything `fit` observed, one entry per completed epoch.
///
/// Equality includes each epoch's wall-clock `elapsed_ms`; compare
/// [`History::metric`] series to check that two runs trained identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub epochs: Vec<EpochStats>,
}

impl History {
    pub fn last(&self) -> Option<&EpochStats> {
        self.epochs.last()
    }

    /// The value of `metric` for every epoch, in order.
    pub fn metric(&self, metric: &str) -> Vec<f64> {
        self.epochs
            .iter()
            .filter_map(|e| e.logs.get(metric).copied())
            .collect()
    }
}
