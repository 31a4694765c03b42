//! The demo run: train a single sigmoid layer on random data, then evaluate.

pub mod config;

pub use config::RunConfig;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::callbacks::{BatchEndLogger, Callback};
use crate::data::synthetic;
use crate::error::Result;
use crate::layers::WeightedAffine;
use crate::loss::BinaryCrossEntropy;
use crate::metrics::{BinaryAccuracy, MetricLogs};
use crate::model::Model;
use crate::optim::Sgd;
use crate::train::{FitConfig, History};

/// Outcome of [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub history: History,
    pub evaluation: MetricLogs,
}

pub fn run(config: &RunConfig) -> Result<RunReport> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let train = synthetic::normal_dataset(&mut rng, config.train_samples, config.input_dim)?;
    info!(
        "training set: {} samples, {} features",
        train.len(),
        train.input_dim()
    );

    let mut model = Model::new(config.input_dim)
        .add(WeightedAffine::new(config.units))
        .build(&mut rng)?
        .compile(
            BinaryCrossEntropy::new(config.epsilon)?,
            Sgd::new(config.learning_rate).with_momentum(config.momentum),
            vec![Box::new(BinaryAccuracy::default())],
        )?;

    let fit_config = FitConfig::new(config.epochs, config.batch_size);
    let mut batch_logger = BatchEndLogger::new();
    let mut callbacks: Vec<&mut dyn Callback> = Vec::new();
    if config.with_batch_logger {
        callbacks.push(&mut batch_logger);
    }
    let history = model.fit(&train, &fit_config, &mut callbacks)?;

    let test = synthetic::uniform_dataset(&mut rng, config.test_samples, config.input_dim)?;
    let evaluation = model.evaluate(&test, config.test_batch_size, &mut [])?;

    Ok(RunReport { history, evaluation })
}
