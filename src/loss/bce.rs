use crate::autodiff::tape::{Tape, Var};
use crate::error::{Error, Result};
use crate::loss::Loss;
use crate::math::matrix::Matrix;

pub const DEFAULT_EPSILON: f64 = 1e-7;

/// Clipped binary cross-entropy, mean-reduced:
///
/// `p = clip(y_pred, ε, 1-ε)`,
/// `L = mean(-y·ln(p+ε) - (1-y)·ln(1-p+ε))`.
///
/// The clip bound and the additive ε inside the logarithms are both kept;
/// results must stay identical to that formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryCrossEntropy {
    epsilon: f64,
}

impl BinaryCrossEntropy {
    pub fn new(epsilon: f64) -> Result<BinaryCrossEntropy> {
        if !(epsilon > 0.0 && epsilon < 0.5) {
            return Err(Error::InvalidConfig(format!(
                "epsilon must lie in (0, 0.5), got {epsilon}"
            )));
        }
        Ok(BinaryCrossEntropy { epsilon })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Loss value for plain matrices, without recording gradients.
    pub fn value(&self, y_true: &Matrix, y_pred: &Matrix) -> Result<f64> {
        let mut tape = Tape::detached();
        let y = tape.constant(y_true.clone());
        let p = tape.constant(y_pred.clone());
        let loss = self.compute(&mut tape, y, p)?;
        tape.value(loss).scalar_value()
    }
}

impl Default for BinaryCrossEntropy {
    fn default() -> Self {
        BinaryCrossEntropy { epsilon: DEFAULT_EPSILON }
    }
}

impl Loss for BinaryCrossEntropy {
    fn name(&self) -> &str {
        "binary_crossentropy"
    }

    fn compute(&self, tape: &mut Tape, y_true: Var, y_pred: Var) -> Result<Var> {
        let eps = self.epsilon;
        tape.value(y_true).ensure_same_shape(tape.value(y_pred), "loss prediction")?;

        let p = tape.clip(y_pred, eps, 1.0 - eps);

        // ln(p + ε)
        let shifted = tape.add_scalar(p, eps);
        let log_p = tape.ln(shifted);

        // ln(1 - p + ε)
        let neg_p = tape.scale(p, -1.0);
        let one_minus_p = tape.add_scalar(neg_p, 1.0);
        let shifted = tape.add_scalar(one_minus_p, eps);
        let log_q = tape.ln(shifted);

        // -y·ln(p+ε) - (1-y)·ln(1-p+ε)
        let pos = tape.mul(y_true, log_p)?;
        let pos = tape.scale(pos, -1.0);
        let neg_y = tape.scale(y_true, -1.0);
        let one_minus_y = tape.add_scalar(neg_y, 1.0);
        let neg = tape.mul(one_minus_y, log_q)?;
        let bce = tape.sub(pos, neg)?;

        Ok(tape.mean(bce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::parameter::Parameter;

    fn column(values: &[f64]) -> Matrix {
        Matrix::from_vec(values.len(), 1, values.to_vec()).unwrap()
    }

    /// Straight evaluation of the formula, in the same operation order.
    fn closed_form(y: &[f64], p: &[f64], eps: f64) -> f64 {
        let total: f64 = y
            .iter()
            .zip(p)
            .map(|(&y, &p)| {
                let p = p.clamp(eps, 1.0 - eps);
                -y * (p + eps).ln() - (1.0 - y) * (1.0 - p + eps).ln()
            })
            .sum();
        total / y.len() as f64
    }

    #[test]
    fn hand_computed_batch() {
        let loss = BinaryCrossEntropy::default();
        let value = loss.value(&column(&[1.0, 0.0]), &column(&[0.9, 0.1])).unwrap();
        assert!((value - 0.105360).abs() < 5e-7);
        assert_eq!(value, closed_form(&[1.0, 0.0], &[0.9, 0.1], DEFAULT_EPSILON));
    }

    #[test]
    fn matches_closed_form_exactly() {
        let y = [1.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let p = [0.0, 1.0, 0.37, 0.999999999, 1e-12, 0.62];
        for eps in [1e-7, 1e-3] {
            let loss = BinaryCrossEntropy::new(eps).unwrap();
            let value = loss.value(&column(&y), &column(&p)).unwrap();
            assert_eq!(value, closed_form(&y, &p, eps));
        }
    }

    #[test]
    fn is_non_negative_and_near_zero_for_perfect_predictions() {
        let loss = BinaryCrossEntropy::default();
        let y = column(&[1.0, 0.0, 1.0, 0.0]);
        let perfect = loss.value(&y, &y).unwrap();
        assert!(perfect.abs() < 1e-6);

        for k in 1..20 {
            let q = k as f64 / 20.0;
            let p = column(&[q, 1.0 - q, q * q, 1.0 - q * q]);
            let value = loss.value(&y, &p).unwrap();
            assert!(value >= 0.0);
            assert!(value > perfect);
        }
    }

    #[test]
    fn saturated_predictions_stay_finite() {
        let loss = BinaryCrossEntropy::default();
        let value = loss.value(&column(&[1.0, 0.0]), &column(&[0.0, 1.0])).unwrap();
        assert!(value.is_finite());
        assert!(value > 10.0);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let loss = BinaryCrossEntropy::default();
        let err = loss.value(&column(&[1.0, 0.0]), &column(&[0.5])).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn epsilon_is_validated() {
        assert!(BinaryCrossEntropy::new(0.0).is_err());
        assert!(BinaryCrossEntropy::new(0.5).is_err());
        assert_eq!(BinaryCrossEntropy::default().epsilon(), 1e-7);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let loss = BinaryCrossEntropy::default();
        let y = column(&[1.0, 0.0, 1.0]);
        let pred = Parameter::trainable("pred", column(&[0.3, 0.6, 0.9]));

        let mut tape = Tape::recording();
        let yv = tape.constant(y.clone());
        let pv = tape.parameter(&pred);
        let l = loss.compute(&mut tape, yv, pv).unwrap();
        let grad = tape.gradient(l, &[&pred]).unwrap().remove(0);

        let h = 1e-6;
        for i in 0..3 {
            let mut plus = pred.value().clone();
            plus.data[i][0] += h;
            let mut minus = pred.value().clone();
            minus.data[i][0] -= h;
            let numeric = (loss.value(&y, &plus).unwrap() - loss.value(&y, &minus).unwrap()) / (2.0 * h);
            assert!((numeric - grad.data[i][0]).abs() < 1e-6);
        }
    }
}
