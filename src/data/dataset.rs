use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Features and labels whose rows belong together.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    features: Matrix,
    labels: Matrix,
}

impl Batch {
    pub fn new(features: Matrix, labels: Matrix) -> Result<Batch> {
        ensure_rows_match(&features, &labels)?;
        Ok(Batch { features, labels })
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn labels(&self) -> &Matrix {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.features.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An in-memory dataset of `(features, labels)` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Matrix,
}

impl Dataset {
    pub fn new(features: Matrix, labels: Matrix) -> Result<Dataset> {
        ensure_rows_match(&features, &labels)?;
        Ok(Dataset { features, labels })
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn labels(&self) -> &Matrix {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.features.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_dim(&self) -> usize {
        self.features.cols
    }

    pub fn output_dim(&self) -> usize {
        self.labels.cols
    }

    /// Consecutive batches of `batch_size` rows; the last one may be shorter.
    pub fn batches(&self, batch_size: usize) -> Result<Batches<'_>> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(Batches {
            dataset: self,
            batch_size,
            cursor: 0,
        })
    }

    /// A copy with rows permuted by `rng`.
    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Dataset {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        Dataset {
            features: self.features.select_rows(&indices),
            labels: self.labels.select_rows(&indices),
        }
    }
}

/// Iterator returned by [`Dataset::batches`].
pub struct Batches<'a> {
    dataset: &'a Dataset,
    batch_size: usize,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let n = self.dataset.len();
        if self.cursor >= n {
            return None;
        }
        let start = self.cursor;
        let end = (start + self.batch_size).min(n);
        self.cursor = end;
        Some(Batch {
            features: self.dataset.features.slice_rows(start, end),
            labels: self.dataset.labels.slice_rows(start, end),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.dataset.len().saturating_sub(self.cursor);
        let batches = remaining.div_ceil(self.batch_size);
        (batches, Some(batches))
    }
}

fn ensure_rows_match(features: &Matrix, labels: &Matrix) -> Result<()> {
    if features.rows != labels.rows {
        return Err(Error::ShapeMismatch {
            what: "labels",
            expected: (features.rows, labels.cols),
            actual: labels.shape(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counting(n: usize) -> Dataset {
        let x = Matrix::from_vec(n, 1, (0..n).map(|i| i as f64).collect()).unwrap();
        let y = Matrix::from_vec(n, 1, (0..n).map(|i| (i % 2) as f64).collect()).unwrap();
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn rows_must_match() {
        let err = Dataset::new(Matrix::zeros(4, 2), Matrix::zeros(3, 1)).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(Batch::new(Matrix::zeros(2, 2), Matrix::zeros(1, 1)).is_err());
    }

    #[test]
    fn batches_cover_every_row_once() {
        let ds = counting(1000);
        let sizes: Vec<usize> = ds.batches(256).unwrap().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![256, 256, 256, 232]);
        assert_eq!(ds.batches(256).unwrap().size_hint(), (4, Some(4)));

        let last = ds.batches(256).unwrap().last().unwrap();
        assert_eq!(last.features().data[0][0], 768.0);
        assert_eq!(last.labels().data[0][0], 0.0);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(counting(3).batches(0).is_err());
    }

    #[test]
    fn shuffle_keeps_pairs_together() {
        let ds = counting(50);
        let shuffled = ds.shuffled(&mut StdRng::seed_from_u64(5));
        assert_ne!(shuffled, ds);
        for (x, y) in shuffled.features().iter().zip(shuffled.labels().iter()) {
            assert_eq!((*x as usize % 2) as f64, *y);
        }
    }
}
