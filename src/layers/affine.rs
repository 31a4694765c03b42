use rand::rngs::StdRng;

use crate::activation::activation::Activation;
use crate::autodiff::parameter::Parameter;
use crate::autodiff::tape::{Tape, Var};
use crate::error::{Error, Result};
use crate::layers::layer::{Layer, Mode};
use crate::math::matrix::Matrix;

/// Fully connected layer: `activation(x · W + b)`, sigmoid by default.
///
/// `W` has shape `(input_dim, units)` and is Glorot-uniform initialized;
/// `b` has shape `(1, units)` and starts at zero.
#[derive(Debug)]
pub struct WeightedAffine {
    name: String,
    units: usize,
    activation: Activation,
    params: Option<AffineParams>,
}

#[derive(Debug)]
struct AffineParams {
    input_dim: usize,
    weights: Parameter,
    biases: Parameter,
}

impl WeightedAffine {
    pub fn new(units: usize) -> WeightedAffine {
        WeightedAffine {
            name: "weighted_affine".to_string(),
            units,
            activation: Activation::Sigmoid,
            params: None,
        }
    }

    pub fn with_activation(mut self, activation: Activation) -> WeightedAffine {
        self.activation = activation;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> WeightedAffine {
        self.name = name.into();
        self
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Input width fixed by `build`, if built.
    pub fn input_dim(&self) -> Option<usize> {
        self.params.as_ref().map(|p| p.input_dim)
    }

    pub fn weights(&self) -> Option<&Parameter> {
        self.params.as_ref().map(|p| &p.weights)
    }

    pub fn biases(&self) -> Option<&Parameter> {
        self.params.as_ref().map(|p| &p.biases)
    }

    fn built_params(&self) -> Result<&AffineParams> {
        self.params.as_ref().ok_or_else(|| Error::NotBuilt {
            layer: self.name.clone(),
        })
    }
}

impl Layer for WeightedAffine {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&mut self, input_dim: usize, rng: &mut StdRng) -> Result<usize> {
        if self.params.is_some() {
            return Err(Error::AlreadyBuilt { layer: self.name.clone() });
        }
        if self.units == 0 || input_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "layer `{}` needs positive dimensions, got input_dim={input_dim}, units={}",
                self.name, self.units
            )));
        }

        let weights = Matrix::glorot_uniform(input_dim, self.units, rng)?;
        let biases = Matrix::zeros(1, self.units);
        self.params = Some(AffineParams {
            input_dim,
            weights: Parameter::trainable(format!("{}/weights", self.name), weights),
            biases: Parameter::trainable(format!("{}/biases", self.name), biases),
        });
        Ok(self.units)
    }

    fn is_built(&self) -> bool {
        self.params.is_some()
    }

    fn forward(&mut self, tape: &mut Tape, input: Var, _mode: Mode) -> Result<Var> {
        let params = self.built_params()?;
        let (rows, cols) = tape.value(input).shape();
        if cols != params.input_dim {
            return Err(Error::ShapeMismatch {
                what: "layer input",
                expected: (rows, params.input_dim),
                actual: (rows, cols),
            });
        }

        let weights = tape.parameter(&params.weights);
        let biases = tape.parameter(&params.biases);
        let z = tape.matmul(input, weights)?;
        let z = tape.add_row(z, biases)?;
        Ok(tape.activate(z, self.activation))
    }

    fn parameters(&self) -> Vec<&Parameter> {
        match &self.params {
            Some(p) => vec![&p.weights, &p.biases],
            None => Vec::new(),
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        match &mut self.params {
            Some(p) => vec![&mut p.weights, &mut p.biases],
            None => Vec::new(),
        }
    }
}
