use std::collections::HashMap;

use crate::autodiff::parameter::{ParamId, Parameter};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::optim::Optimizer;

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Stochastic gradient descent with optional (Nesterov) momentum.
///
/// Without momentum: `p -= lr·g`.
/// With momentum `m`: `v = m·v - lr·g`, then `p += v`, or
/// `p += m·v - lr·g` when Nesterov is enabled.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    pub nesterov: bool,
    velocities: HashMap<ParamId, Matrix>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd {
            learning_rate,
            momentum: 0.0,
            nesterov: false,
            velocities: HashMap::new(),
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Sgd {
        self.momentum = momentum;
        self
    }

    pub fn with_nesterov(mut self, nesterov: bool) -> Sgd {
        self.nesterov = nesterov;
        self
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new(DEFAULT_LEARNING_RATE)
    }
}

impl Optimizer for Sgd {
    fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(Error::InvalidConfig(format!(
                "momentum must lie in [0, 1), got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    fn apply(&mut self, grads: &[Matrix], params: &mut [&mut Parameter]) -> Result<()> {
        if grads.len() != params.len() {
            return Err(Error::ShapeMismatch {
                what: "gradient list",
                expected: (params.len(), 1),
                actual: (grads.len(), 1),
            });
        }
        for (grad, param) in grads.iter().zip(params.iter()) {
            param.value().ensure_same_shape(grad, "gradient")?;
        }

        let lr = self.learning_rate;
        let mu = self.momentum;

        for (grad, param) in grads.iter().zip(params.iter_mut()) {
            if mu == 0.0 {
                param.value_mut().zip_apply(grad, "gradient", |p, g| *p -= lr * g)?;
                continue;
            }

            let velocity = self
                .velocities
                .entry(param.id())
                .or_insert_with(|| Matrix::zeros(grad.rows, grad.cols));
            velocity.zip_apply(grad, "velocity", |v, g| *v = mu * *v - lr * g)?;

            let step = if self.nesterov {
                velocity.zip_map(grad, "velocity", |v, g| mu * v - lr * g)?
            } else {
                velocity.clone()
            };
            param.value_mut().zip_apply(&step, "gradient", |p, s| *p += s)?;
        }

        Ok(())
    }
}
