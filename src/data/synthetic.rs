//! Random datasets for demos and tests. All generators draw from the
//! caller's seeded generator, so equal seeds give equal data.

use rand::Rng;

use crate::data::dataset::Dataset;
use crate::error::Result;
use crate::math::matrix::Matrix;

/// Rounds half-to-even, then clamps into `{0, 1}`.
pub fn binary_labels(values: &Matrix) -> Matrix {
    values.map(|v| v.round_ties_even().clamp(0.0, 1.0))
}

/// `samples × input_dim` standard-normal features; one label column from
/// rounded standard-normal draws.
pub fn normal_dataset<R: Rng + ?Sized>(rng: &mut R, samples: usize, input_dim: usize) -> Result<Dataset> {
    let features = Matrix::random_standard_normal(samples, input_dim, rng);
    let labels = binary_labels(&Matrix::random_standard_normal(samples, 1, rng));
    Dataset::new(features, labels)
}

/// `samples × input_dim` features uniform in `[0, 1)`; one label column from
/// rounded uniform draws.
pub fn uniform_dataset<R: Rng + ?Sized>(rng: &mut R, samples: usize, input_dim: usize) -> Result<Dataset> {
    let features = Matrix::random_uniform(samples, input_dim, 0.0, 1.0, rng)?;
    let labels = binary_labels(&Matrix::random_uniform(samples, 1, 0.0, 1.0, rng)?);
    Dataset::new(features, labels)
}
