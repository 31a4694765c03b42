use std::io::{self, Write};

use log::debug;
use rand::rngs::StdRng;

use crate::autodiff::parameter::Parameter;
use crate::autodiff::tape::{Tape, Var};
use crate::error::{Error, Result};
use crate::layers::layer::{Layer, Mode};
use crate::loss::Loss;
use crate::math::matrix::Matrix;
use crate::metrics::mean::Mean;
use crate::metrics::{collect_logs, MetricLogs, PredictionMetric, TrackedMetric};
use crate::optim::Optimizer;

/// A stack of layers applied in order to inputs of width `input_dim`.
///
/// Lifecycle: `new` → `add`… → `build` → `compile`.
pub struct Model {
    input_dim: usize,
    layers: Vec<Box<dyn Layer>>,
    output_dim: Option<usize>,
}

impl Model {
    pub fn new(input_dim: usize) -> Model {
        Model {
            input_dim,
            layers: Vec::new(),
            output_dim: None,
        }
    }

    pub fn add(mut self, layer: impl Layer + 'static) -> Model {
        self.layers.push(Box::new(layer));
        self
    }

    /// Builds every layer, threading each output width into the next layer.
    pub fn build(mut self, rng: &mut StdRng) -> Result<Model> {
        if self.output_dim.is_some() {
            return Err(Error::AlreadyBuilt { layer: "model".into() });
        }
        if self.layers.is_empty() {
            return Err(Error::InvalidConfig("model has no layers".into()));
        }
        if self.input_dim == 0 {
            return Err(Error::InvalidConfig("model input_dim must be positive".into()));
        }

        let mut width = self.input_dim;
        for layer in self.layers.iter_mut() {
            width = layer.build(width, rng)?;
            debug!("built layer `{}` with output width {width}", layer.name());
        }
        self.output_dim = Some(width);
        Ok(self)
    }

    pub fn is_built(&self) -> bool {
        self.output_dim.is_some()
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> Option<usize> {
        self.output_dim
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Records the forward pass of every layer on `tape`.
    pub fn forward(&mut self, tape: &mut Tape, input: Var, mode: Mode) -> Result<Var> {
        if !self.is_built() {
            return Err(Error::NotBuilt { layer: "model".into() });
        }
        let mut current = input;
        for layer in self.layers.iter_mut() {
            current = layer.forward(tape, current, mode)?;
        }
        Ok(current)
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    pub fn trainable_parameters(&self) -> Vec<&Parameter> {
        self.parameters().into_iter().filter(|p| p.is_trainable()).collect()
    }

    pub fn trainable_parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.parameters_mut())
            .filter(|p| p.is_trainable())
            .collect()
    }

    /// Binds the loss, optimizer and metrics used by the step runners.
    ///
    /// A `"loss"` mean tracker is always registered first.
    pub fn compile(
        self,
        loss: impl Loss + 'static,
        optimizer: impl Optimizer + 'static,
        metrics: Vec<Box<dyn PredictionMetric>>,
    ) -> Result<CompiledModel> {
        if !self.is_built() {
            return Err(Error::NotBuilt { layer: "model".into() });
        }
        optimizer.validate()?;

        let mut tracked = vec![TrackedMetric::Loss(Mean::new("loss"))];
        tracked.extend(metrics.into_iter().map(TrackedMetric::Prediction));

        Ok(CompiledModel {
            model: self,
            loss: Box::new(loss),
            optimizer: Box::new(optimizer),
            metrics: tracked,
            notice: Box::new(io::stdout()),
        })
    }
}

/// A built model bound to a loss, an optimizer and metric accumulators.
///
/// The custom step runners live in `model::steps`; the epoch loops in
/// `train::loop_fn`. The evaluation notice goes to stdout unless another
/// writer is set with [`CompiledModel::with_notice_writer`].
pub struct CompiledModel {
    pub(crate) model: Model,
    pub(crate) loss: Box<dyn Loss>,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) metrics: Vec<TrackedMetric>,
    pub(crate) notice: Box<dyn Write>,
}

impl CompiledModel {
    /// Sends the per-batch "Evaluation starts..." line to `out`.
    pub fn with_notice_writer(mut self, out: impl Write + 'static) -> CompiledModel {
        self.notice = Box::new(out);
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn loss(&self) -> &dyn Loss {
        self.loss.as_ref()
    }

    pub fn metrics(&self) -> &[TrackedMetric] {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.iter_mut().for_each(TrackedMetric::reset);
    }

    pub fn metric_logs(&self) -> MetricLogs {
        collect_logs(&self.metrics)
    }

    /// Forward pass in `Mode::Eval` without metrics or gradients.
    pub fn predict(&mut self, features: &Matrix) -> Result<Matrix> {
        let mut tape = Tape::detached();
        let x = tape.constant(features.clone());
        let y_pred = self.model.forward(&mut tape, x, Mode::Eval)?;
        Ok(tape.value(y_pred).clone())
    }
}
