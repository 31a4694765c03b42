pub mod math;
pub mod activation;
pub mod autodiff;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod optim;
pub mod callbacks;
pub mod data;
pub mod model;
pub mod train;
pub mod driver;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::Activation;
pub use autodiff::{Parameter, Tape, Var};
pub use layers::{Dropout, Layer, Mode, WeightedAffine};
pub use loss::{BinaryCrossEntropy, Loss};
pub use metrics::{BinaryAccuracy, Mean, MetricLogs, PredictionMetric, TrackedMetric};
pub use optim::{Optimizer, Sgd};
pub use callbacks::{BatchEndLogger, Callback};
pub use data::{Batch, Dataset};
pub use model::{CompiledModel, Model};
pub use train::{EpochStats, FitConfig, History};
pub use error::{Error, Result};
