use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{Error, Result};

/// Dense row-major 2-D matrix of `f64`.
///
/// Every operation that combines two matrices checks shapes and reports a
/// `ShapeMismatch` instead of panicking.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        }
    }

    /// A 1×1 matrix holding `value`.
    pub fn scalar(value: f64) -> Matrix {
        Matrix::filled(1, 1, value)
    }

    /// Builds a matrix from row vectors. Rows must all have the same length.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(Error::ShapeMismatch {
                what: "matrix row",
                expected: (1, cols),
                actual: (1, bad.len()),
            });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a `rows × cols` matrix from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Matrix> {
        if values.len() != rows * cols {
            return Err(Error::ShapeMismatch {
                what: "matrix buffer",
                expected: (rows, cols),
                actual: (1, values.len()),
            });
        }
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            values.chunks(cols).map(<[f64]>::to_vec).collect()
        };
        Ok(Matrix { rows, cols, data })
    }

    /// Samples every entry uniformly from `[low, high)`.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Result<Matrix> {
        if !(low < high) {
            return Err(Error::InvalidConfig(format!(
                "uniform range must satisfy low < high, got [{low}, {high})"
            )));
        }
        let dist = Uniform::new(low, high);
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = dist.sample(rng);
            }
        }
        Ok(res)
    }

    /// Samples every entry from N(0, 1).
    pub fn random_standard_normal<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = StandardNormal.sample(rng);
            }
        }
        res
    }

    /// Glorot (Xavier) uniform initialization for a `fan_in × fan_out` weight.
    ///
    /// Samples from U(-limit, limit) with `limit = sqrt(6 / (fan_in + fan_out))`,
    /// keeping activation variance roughly constant across sigmoid/tanh layers.
    pub fn glorot_uniform<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Result<Matrix> {
        if fan_in + fan_out == 0 {
            return Err(Error::InvalidConfig("glorot initialization needs a non-empty shape".into()));
        }
        let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
        Matrix::random_uniform(fan_in, fan_out, -limit, limit, rng)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates all entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.data.iter().flatten()
    }

    /// The single value of a 1×1 matrix.
    pub fn scalar_value(&self) -> Result<f64> {
        if self.shape() != (1, 1) {
            return Err(Error::ShapeMismatch {
                what: "scalar",
                expected: (1, 1),
                actual: self.shape(),
            });
        }
        Ok(self.data[0][0])
    }

    /// Fails with `ShapeMismatch` unless `other` has the same shape.
    pub fn ensure_same_shape(&self, other: &Matrix, what: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                what,
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        Ok(())
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, other: &Matrix, what: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.ensure_same_shape(other, what)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.iter().zip(b.iter()).map(|(&x, &y)| functor(x, y)).collect())
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// In-place element-wise update: `functor(self[i][j], other[i][j])`.
    pub fn zip_apply<F>(&mut self, other: &Matrix, what: &'static str, mut functor: F) -> Result<()>
    where
        F: FnMut(&mut f64, f64),
    {
        self.ensure_same_shape(other, what)?;
        for (row, other_row) in self.data.iter_mut().zip(other.data.iter()) {
            for (x, &y) in row.iter_mut().zip(other_row.iter()) {
                functor(x, y);
            }
        }
        Ok(())
    }

    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                what: "matmul operand",
                expected: (self.cols, rhs.cols),
                actual: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Adds a `1 × cols` row vector to every row.
    pub fn add_row(&self, row: &Matrix) -> Result<Matrix> {
        if row.shape() != (1, self.cols) {
            return Err(Error::ShapeMismatch {
                what: "broadcast row",
                expected: (1, self.cols),
                actual: row.shape(),
            });
        }
        let bias = &row.data[0];
        let data = self
            .data
            .iter()
            .map(|r| r.iter().zip(bias.iter()).map(|(x, b)| x + b).collect())
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Column sums as a `1 × cols` row vector.
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }
        res
    }

    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Arithmetic mean of all entries; `0.0` for an empty matrix.
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.sum() / self.len() as f64
    }

    /// Copies rows `start..end` into a new matrix.
    pub fn slice_rows(&self, start: usize, end: usize) -> Matrix {
        let data = self.data[start..end].to_vec();
        Matrix {
            rows: data.len(),
            cols: self.cols,
            data,
        }
    }

    /// Gathers the given rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        let data: Vec<Vec<f64>> = indices.iter().map(|&i| self.data[i].clone()).collect();
        Matrix {
            rows: data.len(),
            cols: self.cols,
            data,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn matmul_checks_inner_dimension() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![1.0], vec![1.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.data, vec![vec![3.0], vec![7.0]]);

        let bad = Matrix::zeros(3, 1);
        assert!(matches!(a.matmul(&bad), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn add_row_broadcasts_over_rows() {
        let a = Matrix::zeros(3, 2);
        let row = Matrix::from_rows(vec![vec![1.0, -1.0]]).unwrap();
        let res = a.add_row(&row).unwrap();
        assert!(res.data.iter().all(|r| r == &vec![1.0, -1.0]));
        assert!(a.add_row(&Matrix::zeros(1, 3)).is_err());
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }

    #[test]
    fn from_vec_is_row_major() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.data[1], vec![4.0, 5.0, 6.0]);
        assert!(Matrix::from_vec(2, 2, vec![1.0]).is_err());
    }

    #[test]
    fn sum_rows_and_mean() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.sum_rows().data, vec![vec![4.0, 6.0]]);
        assert_eq!(m.mean(), 2.5);
        assert_eq!(Matrix::default().mean(), 0.0);
    }

    #[test]
    fn glorot_uniform_stays_within_limit() {
        let mut rng = StdRng::seed_from_u64(7);
        let w = Matrix::glorot_uniform(32, 1, &mut rng).unwrap();
        let limit = (6.0_f64 / 33.0).sqrt();
        assert_eq!(w.shape(), (32, 1));
        assert!(w.iter().all(|x| x.abs() <= limit));
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let a = Matrix::random_standard_normal(4, 4, &mut StdRng::seed_from_u64(43));
        let b = Matrix::random_standard_normal(4, 4, &mut StdRng::seed_from_u64(43));
        assert_eq!(a, b);
    }
}
