use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::callbacks::Callback;
use crate::data::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metrics::MetricLogs;
use crate::model::model::CompiledModel;
use crate::train::epoch_stats::{EpochStats, History};
use crate::train::train_config::FitConfig;

impl CompiledModel {
    /// Trains for `config.epochs` epochs and returns the per-epoch history.
    ///
    /// Metrics are reset at the start of every epoch, so each epoch's logs
    /// aggregate that epoch only. Any step error aborts the whole run.
    pub fn fit(
        &mut self,
        dataset: &Dataset,
        config: &FitConfig,
        callbacks: &mut [&mut dyn Callback],
    ) -> Result<History> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::InvalidConfig("training dataset is empty".into()));
        }

        let mut shuffle_rng = StdRng::seed_from_u64(config.seed);
        let mut history = History::default();

        for cb in callbacks.iter_mut() {
            cb.on_train_begin();
        }

        for epoch in 1..=config.epochs {
            let t_start = Instant::now();
            self.reset_metrics();
            for cb in callbacks.iter_mut() {
                cb.on_epoch_begin(epoch);
            }

            // ── One full pass over the training data ───────────────────────
            let shuffled;
            let epoch_data = if config.shuffle {
                shuffled = dataset.shuffled(&mut shuffle_rng);
                &shuffled
            } else {
                dataset
            };
            for (batch_index, batch) in epoch_data.batches(config.batch_size)?.enumerate() {
                let logs = self.train_step(&batch)?;
                for cb in callbacks.iter_mut() {
                    cb.on_batch_end(batch_index, &logs);
                }
            }

            // ── Emit progress ──────────────────────────────────────────────
            let logs = self.metric_logs();
            let elapsed_ms = t_start.elapsed().as_millis() as u64;
            info!("epoch {epoch}/{}: {} ({elapsed_ms} ms)", config.epochs, format_logs(&logs));

            for cb in callbacks.iter_mut() {
                cb.on_epoch_end(epoch, &logs);
            }
            history.epochs.push(EpochStats {
                epoch,
                total_epochs: config.epochs,
                logs,
                elapsed_ms,
            });
        }

        for cb in callbacks.iter_mut() {
            cb.on_train_end(&history);
        }
        Ok(history)
    }

    /// Runs one evaluation pass and returns metrics aggregated over it.
    pub fn evaluate(
        &mut self,
        dataset: &Dataset,
        batch_size: usize,
        callbacks: &mut [&mut dyn Callback],
    ) -> Result<MetricLogs> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if dataset.is_empty() {
            return Err(Error::InvalidConfig("evaluation dataset is empty".into()));
        }

        self.reset_metrics();
        for cb in callbacks.iter_mut() {
            cb.on_test_begin();
        }
        for batch in dataset.batches(batch_size)? {
            self.test_step(&batch)?;
        }

        let logs = self.metric_logs();
        info!("evaluation: {}", format_logs(&logs));
        Ok(logs)
    }
}

fn format_logs(logs: &MetricLogs) -> String {
    logs.iter()
        .map(|(name, value)| format!("{name}={value:.4}"))
        .collect::<Vec<_>>()
        .join(" ")
}
