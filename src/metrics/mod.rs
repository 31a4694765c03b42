//! Stateful metric accumulators.
//!
//! Every metric supports `reset` / `update` / `result`. The model tracks them
//! through [`TrackedMetric`], which tags each one with the role that decides
//! what it is fed: the step's scalar loss, or the `(y_true, y_pred)` pair.

pub mod binary_accuracy;
pub mod mean;

pub use binary_accuracy::BinaryAccuracy;
pub use mean::Mean;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::math::matrix::Matrix;

/// Metric name → current aggregated value.
pub type MetricLogs = BTreeMap<String, f64>;

pub trait Metric {
    fn name(&self) -> &str;
    fn reset(&mut self);
    fn result(&self) -> f64;
}

/// A metric computed from labels and predictions.
pub trait PredictionMetric: Metric {
    /// Fails if `update` would reject these inputs. Called before any state
    /// is touched so a failing step leaves every metric unchanged.
    fn check(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
        y_true.ensure_same_shape(y_pred, "metric prediction")
    }

    fn update(&mut self, y_true: &Matrix, y_pred: &Matrix) -> Result<()>;
}

pub enum TrackedMetric {
    /// Fed the scalar loss of each step.
    Loss(Mean),
    /// Fed `(y_true, y_pred)` of each step.
    Prediction(Box<dyn PredictionMetric>),
}

impl TrackedMetric {
    pub fn name(&self) -> &str {
        match self {
            TrackedMetric::Loss(m) => m.name(),
            TrackedMetric::Prediction(m) => m.name(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            TrackedMetric::Loss(m) => m.reset(),
            TrackedMetric::Prediction(m) => m.reset(),
        }
    }

    pub fn result(&self) -> f64 {
        match self {
            TrackedMetric::Loss(m) => m.result(),
            TrackedMetric::Prediction(m) => m.result(),
        }
    }
}

/// Snapshot of every metric's current result.
pub fn collect_logs(metrics: &[TrackedMetric]) -> MetricLogs {
    metrics
        .iter()
        .map(|m| (m.name().to_string(), m.result()))
        .collect()
}
