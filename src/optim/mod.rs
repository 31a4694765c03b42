pub mod sgd;

pub use sgd::Sgd;

use crate::autodiff::parameter::Parameter;
use crate::error::Result;
use crate::math::matrix::Matrix;

/// Applies gradient updates to parameters in place.
pub trait Optimizer {
    /// Rejects invalid hyperparameters; called once when a model is compiled.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Updates `params[i]` with `grads[i]`.
    ///
    /// Every shape is checked before the first parameter is touched, so an
    /// error leaves all parameters unchanged.
    fn apply(&mut self, grads: &[Matrix], params: &mut [&mut Parameter]) -> Result<()>;
}
