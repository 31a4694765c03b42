//! Reverse-mode automatic differentiation over [`Matrix`] values.
//!
//! A [`Tape`] records every operation of a forward pass as a node holding its
//! value and how it was produced. [`Tape::gradient`] then walks the nodes in
//! reverse, accumulating ∂loss/∂node, and hands back the gradient of every
//! requested [`Parameter`].
//!
//! A detached tape (see [`Tape::detached`]) computes the same values but keeps
//! no provenance, so nothing recorded on it can be differentiated. Evaluation
//! and inference run on a detached tape.

use crate::activation::activation::Activation;
use crate::autodiff::parameter::{ParamId, Parameter};
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Handle to a value recorded on a [`Tape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Var(usize);

#[derive(Debug, Clone)]
enum Op {
    /// Constant input; receives no gradient of interest.
    Leaf,
    Param(ParamId),
    MatMul(Var, Var),
    /// `lhs + row`, where `row` is `1 × cols` and broadcast over rows.
    AddRow(Var, Var),
    Add(Var, Var),
    Sub(Var, Var),
    Mul(Var, Var),
    Scale(Var, f64),
    AddScalar(Var),
    Clip { input: Var, low: f64, high: f64 },
    Ln(Var),
    Activate(Var, Activation),
    Mean(Var),
}

#[derive(Debug)]
struct Node {
    value: Matrix,
    op: Op,
}

#[derive(Debug)]
pub struct Tape {
    nodes: Vec<Node>,
    recording: bool,
}

impl Tape {
    /// A tape that records provenance so gradients can be computed.
    pub fn recording() -> Tape {
        Tape { nodes: Vec::new(), recording: true }
    }

    /// A tape that only computes values.
    pub fn detached() -> Tape {
        Tape { nodes: Vec::new(), recording: false }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn value(&self, var: Var) -> &Matrix {
        &self.nodes[var.0].value
    }

    fn push(&mut self, value: Matrix, op: Op) -> Var {
        let op = if self.recording { op } else { Op::Leaf };
        self.nodes.push(Node { value, op });
        Var(self.nodes.len() - 1)
    }

    pub fn constant(&mut self, value: Matrix) -> Var {
        self.push(value, Op::Leaf)
    }

    /// Records the current value of `param` so gradients can reach it.
    pub fn parameter(&mut self, param: &Parameter) -> Var {
        self.push(param.value().clone(), Op::Param(param.id()))
    }

    pub fn matmul(&mut self, lhs: Var, rhs: Var) -> Result<Var> {
        let value = self.value(lhs).matmul(self.value(rhs))?;
        Ok(self.push(value, Op::MatMul(lhs, rhs)))
    }

    pub fn add_row(&mut self, lhs: Var, row: Var) -> Result<Var> {
        let value = self.value(lhs).add_row(self.value(row))?;
        Ok(self.push(value, Op::AddRow(lhs, row)))
    }

    pub fn add(&mut self, lhs: Var, rhs: Var) -> Result<Var> {
        let value = self.value(lhs).zip_map(self.value(rhs), "add operand", |a, b| a + b)?;
        Ok(self.push(value, Op::Add(lhs, rhs)))
    }

    pub fn sub(&mut self, lhs: Var, rhs: Var) -> Result<Var> {
        let value = self.value(lhs).zip_map(self.value(rhs), "sub operand", |a, b| a - b)?;
        Ok(self.push(value, Op::Sub(lhs, rhs)))
    }

    /// Element-wise (Hadamard) product.
    pub fn mul(&mut self, lhs: Var, rhs: Var) -> Result<Var> {
        let value = self.value(lhs).zip_map(self.value(rhs), "mul operand", |a, b| a * b)?;
        Ok(self.push(value, Op::Mul(lhs, rhs)))
    }

    pub fn scale(&mut self, input: Var, factor: f64) -> Var {
        let value = self.value(input).map(|x| x * factor);
        self.push(value, Op::Scale(input, factor))
    }

    pub fn add_scalar(&mut self, input: Var, offset: f64) -> Var {
        let value = self.value(input).map(|x| x + offset);
        self.push(value, Op::AddScalar(input))
    }

    /// Clamps into `[low, high]`. The gradient passes only where the input
    /// already lay inside the interval.
    pub fn clip(&mut self, input: Var, low: f64, high: f64) -> Var {
        let value = self.value(input).map(|x| x.clamp(low, high));
        self.push(value, Op::Clip { input, low, high })
    }

    pub fn ln(&mut self, input: Var) -> Var {
        let value = self.value(input).map(f64::ln);
        self.push(value, Op::Ln(input))
    }

    pub fn activate(&mut self, input: Var, activation: Activation) -> Var {
        let value = self.value(input).map(|x| activation.function(x));
        self.push(value, Op::Activate(input, activation))
    }

    /// Mean over every element, as a 1×1 matrix.
    pub fn mean(&mut self, input: Var) -> Var {
        let value = Matrix::scalar(self.value(input).mean());
        self.push(value, Op::Mean(input))
    }

    /// Computes ∂loss/∂param for every entry of `params`, in order.
    ///
    /// `loss` must be a 1×1 value. Fails with `GradientUnavailable` if a
    /// parameter was never recorded on this tape or does not influence `loss`.
    pub fn gradient(&self, loss: Var, params: &[&Parameter]) -> Result<Vec<Matrix>> {
        self.value(loss).scalar_value()?;

        let mut grads: Vec<Option<Matrix>> = vec![None; loss.0 + 1];
        grads[loss.0] = Some(Matrix::scalar(1.0));

        for idx in (0..=loss.0).rev() {
            let Some(grad) = grads[idx].take() else {
                continue;
            };
            self.backward(idx, &grad, &mut grads)?;
            grads[idx] = Some(grad);
        }

        params
            .iter()
            .map(|param| {
                let mut total: Option<Matrix> = None;
                for (idx, node) in self.nodes.iter().enumerate().take(loss.0 + 1) {
                    if !matches!(node.op, Op::Param(id) if id == param.id()) {
                        continue;
                    }
                    if let Some(g) = &grads[idx] {
                        total = Some(match total {
                            Some(acc) => acc.zip_map(g, "parameter gradient", |a, b| a + b)?,
                            None => g.clone(),
                        });
                    }
                }
                total.ok_or_else(|| Error::GradientUnavailable {
                    param: param.name().to_string(),
                })
            })
            .collect()
    }

    /// Propagates the upstream gradient of node `idx` into its inputs.
    fn backward(&self, idx: usize, grad: &Matrix, grads: &mut [Option<Matrix>]) -> Result<()> {
        match &self.nodes[idx].op {
            Op::Leaf | Op::Param(_) => {}
            Op::MatMul(lhs, rhs) => {
                let g_lhs = grad.matmul(&self.value(*rhs).transpose())?;
                let g_rhs = self.value(*lhs).transpose().matmul(grad)?;
                accumulate(grads, *lhs, g_lhs)?;
                accumulate(grads, *rhs, g_rhs)?;
            }
            Op::AddRow(lhs, row) => {
                accumulate(grads, *lhs, grad.clone())?;
                accumulate(grads, *row, grad.sum_rows())?;
            }
            Op::Add(lhs, rhs) => {
                accumulate(grads, *lhs, grad.clone())?;
                accumulate(grads, *rhs, grad.clone())?;
            }
            Op::Sub(lhs, rhs) => {
                accumulate(grads, *lhs, grad.clone())?;
                accumulate(grads, *rhs, grad.map(|g| -g))?;
            }
            Op::Mul(lhs, rhs) => {
                let g_lhs = grad.zip_map(self.value(*rhs), "mul gradient", |g, b| g * b)?;
                let g_rhs = grad.zip_map(self.value(*lhs), "mul gradient", |g, a| g * a)?;
                accumulate(grads, *lhs, g_lhs)?;
                accumulate(grads, *rhs, g_rhs)?;
            }
            Op::Scale(input, factor) => {
                let factor = *factor;
                accumulate(grads, *input, grad.map(|g| g * factor))?;
            }
            Op::AddScalar(input) => {
                accumulate(grads, *input, grad.clone())?;
            }
            Op::Clip { input, low, high } => {
                let (low, high) = (*low, *high);
                let g = grad.zip_map(self.value(*input), "clip gradient", |g, x| {
                    if x >= low && x <= high { g } else { 0.0 }
                })?;
                accumulate(grads, *input, g)?;
            }
            Op::Ln(input) => {
                let g = grad.zip_map(self.value(*input), "ln gradient", |g, x| g / x)?;
                accumulate(grads, *input, g)?;
            }
            Op::Activate(input, activation) => {
                let g = grad.zip_map(self.value(*input), "activation gradient", |g, x| {
                    g * activation.derivative(x)
                })?;
                accumulate(grads, *input, g)?;
            }
            Op::Mean(input) => {
                let source = self.value(*input);
                let upstream = grad.scalar_value()?;
                let n = source.len().max(1) as f64;
                accumulate(grads, *input, Matrix::filled(source.rows, source.cols, upstream / n))?;
            }
        }
        Ok(())
    }
}

fn accumulate(grads: &mut [Option<Matrix>], var: Var, grad: Matrix) -> Result<()> {
    let slot = &mut grads[var.0];
    *slot = Some(match slot.take() {
        Some(acc) => acc.zip_map(&grad, "accumulated gradient", |a, b| a + b)?,
        None => grad,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(rows: Vec<Vec<f64>>) -> Parameter {
        Parameter::trainable("p", Matrix::from_rows(rows).unwrap())
    }

    #[test]
    fn gradient_of_mean_of_product() {
        let w = param(vec![vec![2.0, -1.0]]);
        let mut tape = Tape::recording();
        let x = tape.constant(Matrix::from_rows(vec![vec![3.0, 4.0]]).unwrap());
        let wv = tape.parameter(&w);
        let prod = tape.mul(x, wv).unwrap();
        let loss = tape.mean(prod);

        assert_eq!(tape.value(loss).scalar_value().unwrap(), (6.0 - 4.0) / 2.0);
        let grads = tape.gradient(loss, &[&w]).unwrap();
        assert_eq!(grads[0].data, vec![vec![1.5, 2.0]]);
    }

    #[test]
    fn matmul_and_bias_gradients_match_finite_differences() {
        let w = param(vec![vec![0.3], vec![-0.2]]);
        let b = param(vec![vec![0.1]]);
        let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![-1.0, 0.5]]).unwrap();

        let forward = |w: &Parameter, b: &Parameter, tape: &mut Tape| {
            let xv = tape.constant(x.clone());
            let wv = tape.parameter(w);
            let bv = tape.parameter(b);
            let z = tape.matmul(xv, wv).unwrap();
            let z = tape.add_row(z, bv).unwrap();
            let a = tape.activate(z, Activation::Sigmoid);
            tape.mean(a)
        };

        let mut tape = Tape::recording();
        let loss = forward(&w, &b, &mut tape);
        let grads = tape.gradient(loss, &[&w, &b]).unwrap();

        let h = 1e-6;
        for r in 0..2 {
            let mut plus = w.clone();
            plus.value_mut().data[r][0] += h;
            let mut minus = w.clone();
            minus.value_mut().data[r][0] -= h;
            let mut t1 = Tape::detached();
            let mut t2 = Tape::detached();
            let lp = forward(&plus, &b, &mut t1);
            let lm = forward(&minus, &b, &mut t2);
            let numeric = (t1.value(lp).data[0][0] - t2.value(lm).data[0][0]) / (2.0 * h);
            assert!((numeric - grads[0].data[r][0]).abs() < 1e-7);
        }
    }

    #[test]
    fn parameter_used_twice_accumulates() {
        let w = param(vec![vec![3.0]]);
        let mut tape = Tape::recording();
        let a = tape.parameter(&w);
        let b = tape.parameter(&w);
        let sq = tape.mul(a, b).unwrap();
        let loss = tape.mean(sq);
        let grads = tape.gradient(loss, &[&w]).unwrap();
        assert_eq!(grads[0].data, vec![vec![6.0]]);
    }

    #[test]
    fn clip_blocks_gradient_outside_bounds() {
        let w = param(vec![vec![-0.5, 0.5, 1.5]]);
        let mut tape = Tape::recording();
        let wv = tape.parameter(&w);
        let c = tape.clip(wv, 0.0, 1.0);
        let loss = tape.mean(c);
        let grads = tape.gradient(loss, &[&w]).unwrap();
        assert_eq!(grads[0].data, vec![vec![0.0, 1.0 / 3.0, 0.0]]);
    }

    #[test]
    fn disconnected_parameter_has_no_gradient() {
        let used = param(vec![vec![1.0]]);
        let unused = param(vec![vec![1.0]]);
        let mut tape = Tape::recording();
        let u = tape.parameter(&used);
        let _ = tape.parameter(&unused);
        let loss = tape.mean(u);
        let err = tape.gradient(loss, &[&used, &unused]).unwrap_err();
        assert!(matches!(err, Error::GradientUnavailable { .. }));
    }

    #[test]
    fn detached_tape_cannot_differentiate() {
        let w = param(vec![vec![1.0]]);
        let mut tape = Tape::detached();
        let wv = tape.parameter(&w);
        let loss = tape.mean(wv);
        assert_eq!(tape.value(loss).scalar_value().unwrap(), 1.0);
        assert!(tape.gradient(loss, &[&w]).is_err());
    }

    #[test]
    fn non_scalar_loss_is_rejected() {
        let w = param(vec![vec![1.0, 2.0]]);
        let mut tape = Tape::recording();
        let wv = tape.parameter(&w);
        assert!(matches!(
            tape.gradient(wv, &[&w]),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
