//! Observers invoked by the fit and evaluate loops.
//!
//! Epochs are numbered from 1, batches within an epoch from 0. Callbacks
//! only observe; they cannot fail a run.

pub mod batch_logger;

pub use batch_logger::BatchEndLogger;

use crate::metrics::MetricLogs;
use crate::train::epoch_stats::History;

pub trait Callback {
    fn on_train_begin(&mut self) {}

    fn on_epoch_begin(&mut self, _epoch: usize) {}

    /// Called after every training batch with the running metric values.
    fn on_batch_end(&mut self, _batch: usize, _logs: &MetricLogs) {}

    fn on_epoch_end(&mut self, _epoch: usize, _logs: &MetricLogs) {}

    fn on_train_end(&mut self, _history: &History) {}

    fn on_test_begin(&mut self) {}
}
