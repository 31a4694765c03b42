//! The custom per-batch training and evaluation steps.

use std::io::Write;

use log::{debug, warn};

use crate::autodiff::tape::Tape;
use crate::data::dataset::Batch;
use crate::error::Result;
use crate::layers::layer::Mode;
use crate::math::matrix::Matrix;
use crate::metrics::{MetricLogs, TrackedMetric};
use crate::model::model::CompiledModel;

impl CompiledModel {
    /// Runs one optimization step on `batch` and returns the running metrics.
    ///
    /// 1. forward pass (`Mode::Train`) and loss on a recording tape;
    /// 2. gradients for every trainable parameter, then one optimizer update;
    /// 3. metric update: the loss tracker gets the scalar loss, prediction
    ///    metrics get `(y, y_pred)`.
    ///
    /// Everything that can fail runs before the first mutation, so an error
    /// leaves parameters and metrics as they were.
    pub fn train_step(&mut self, batch: &Batch) -> Result<MetricLogs> {
        let mut tape = Tape::recording();
        let x = tape.constant(batch.features().clone());
        let y = tape.constant(batch.labels().clone());

        let y_pred = self.model.forward(&mut tape, x, Mode::Train)?;
        let loss = self.loss.compute(&mut tape, y, y_pred)?;
        let loss_value = tape.value(loss).scalar_value()?;

        let grads = {
            let params = self.model.trainable_parameters();
            tape.gradient(loss, &params)?
        };
        self.check_metrics(batch.labels(), tape.value(y_pred))?;

        let mut params = self.model.trainable_parameters_mut();
        self.optimizer.apply(&grads, &mut params)?;
        debug!("train step: {} rows, loss {loss_value}", batch.len());

        self.update_metrics(loss_value, batch.labels(), tape.value(y_pred))?;
        Ok(self.metric_logs())
    }

    /// Evaluates `batch` without touching parameters and returns the running
    /// metrics.
    ///
    /// Writes `Evaluation starts...` to the notice writer before the batch is
    /// processed. A failed write is logged and ignored.
    pub fn test_step(&mut self, batch: &Batch) -> Result<MetricLogs> {
        if let Err(e) = writeln!(self.notice, "Evaluation starts...") {
            warn!("could not write evaluation notice: {e}");
        }
        let mut tape = Tape::detached();
        let x = tape.constant(batch.features().clone());
        let y = tape.constant(batch.labels().clone());

        let y_pred = self.model.forward(&mut tape, x, Mode::Eval)?;
        let loss = self.loss.compute(&mut tape, y, y_pred)?;
        let loss_value = tape.value(loss).scalar_value()?;

        self.check_metrics(batch.labels(), tape.value(y_pred))?;
        self.update_metrics(loss_value, batch.labels(), tape.value(y_pred))?;
        Ok(self.metric_logs())
    }

    fn check_metrics(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
        for metric in &self.metrics {
            if let TrackedMetric::Prediction(m) = metric {
                m.check(y_true, y_pred)?;
            }
        }
        Ok(())
    }

    fn update_metrics(&mut self, loss: f64, y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
        for metric in self.metrics.iter_mut() {
            match metric {
                TrackedMetric::Loss(m) => m.update(loss),
                TrackedMetric::Prediction(m) => m.update(y_true, y_pred)?,
            }
        }
        Ok(())
    }
}
