use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::autodiff::tape::{Tape, Var};
use crate::error::{Error, Result};
use crate::layers::layer::{Layer, Mode};
use crate::math::matrix::Matrix;

/// Inverted dropout: in `Mode::Train` zeroes each input with probability
/// `rate` and scales survivors by `1 / (1 - rate)`; identity in `Mode::Eval`.
#[derive(Debug)]
pub struct Dropout {
    name: String,
    rate: f64,
    rng: StdRng,
    input_dim: Option<usize>,
}

impl Dropout {
    pub fn new(rate: f64, seed: u64) -> Result<Dropout> {
        if !(0.0..1.0).contains(&rate) {
            return Err(Error::InvalidConfig(format!(
                "dropout rate must lie in [0, 1), got {rate}"
            )));
        }
        Ok(Dropout {
            name: "dropout".to_string(),
            rate,
            rng: StdRng::seed_from_u64(seed),
            input_dim: None,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Layer for Dropout {
    fn name(&self) -> &str {
        &self.name
    }

    fn build(&mut self, input_dim: usize, _rng: &mut StdRng) -> Result<usize> {
        if self.input_dim.is_some() {
            return Err(Error::AlreadyBuilt { layer: self.name.clone() });
        }
        self.input_dim = Some(input_dim);
        Ok(input_dim)
    }

    fn is_built(&self) -> bool {
        self.input_dim.is_some()
    }

    fn forward(&mut self, tape: &mut Tape, input: Var, mode: Mode) -> Result<Var> {
        if self.input_dim.is_none() {
            return Err(Error::NotBuilt { layer: self.name.clone() });
        }
        if mode == Mode::Eval || self.rate == 0.0 {
            return Ok(input);
        }

        let (rows, cols) = tape.value(input).shape();
        let keep = 1.0 - self.rate;
        let mut mask = Matrix::zeros(rows, cols);
        for row in mask.data.iter_mut() {
            for m in row.iter_mut() {
                if self.rng.gen::<f64>() < keep {
                    *m = 1.0 / keep;
                }
            }
        }
        let mask = tape.constant(mask);
        tape.mul(input, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(layer: &mut Dropout, x: Matrix, mode: Mode) -> Matrix {
        let mut tape = Tape::recording();
        let input = tape.constant(x);
        let out = layer.forward(&mut tape, input, mode).unwrap();
        tape.value(out).clone()
    }

    #[test]
    fn eval_mode_is_identity() {
        let mut layer = Dropout::new(0.5, 3).unwrap();
        layer.build(4, &mut StdRng::seed_from_u64(0)).unwrap();
        let x = Matrix::filled(8, 4, 2.0);
        assert_eq!(forward(&mut layer, x.clone(), Mode::Eval), x);
    }

    #[test]
    fn train_mode_drops_and_rescales() {
        let mut layer = Dropout::new(0.5, 3).unwrap();
        layer.build(16, &mut StdRng::seed_from_u64(0)).unwrap();
        let out = forward(&mut layer, Matrix::filled(16, 16, 1.0), Mode::Train);
        assert!(out.iter().all(|&v| v == 0.0 || v == 2.0));
        assert!(out.iter().any(|&v| v == 0.0));
        assert!(out.iter().any(|&v| v == 2.0));
    }

    #[test]
    fn rate_must_be_a_probability() {
        assert!(Dropout::new(1.0, 0).is_err());
        assert!(Dropout::new(-0.1, 0).is_err());
    }
}
