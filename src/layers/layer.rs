use rand::rngs::StdRng;

use crate::autodiff::parameter::Parameter;
use crate::autodiff::tape::{Tape, Var};
use crate::error::Result;

/// Whether a forward pass belongs to training or to evaluation/inference.
///
/// Layers such as dropout behave differently in the two modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// A building block of a [`Model`](crate::model::Model).
///
/// Construction is two-phase: `new` takes static configuration and `build`
/// allocates parameters once the input dimension is known.
pub trait Layer {
    fn name(&self) -> &str;

    /// Allocates parameters for inputs of width `input_dim` and returns the
    /// output width. Fails if the layer is already built.
    fn build(&mut self, input_dim: usize, rng: &mut StdRng) -> Result<usize>;

    fn is_built(&self) -> bool;

    /// Records the layer's computation on `tape`.
    fn forward(&mut self, tape: &mut Tape, input: Var, mode: Mode) -> Result<Var>;

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        Vec::new()
    }
}
