use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::metrics::{Metric, PredictionMetric};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Fraction of elements where `y_pred > threshold` agrees with `y_true`,
/// accumulated over every update since the last reset.
#[derive(Debug, Clone)]
pub struct BinaryAccuracy {
    threshold: f64,
    correct: usize,
    total: usize,
}

impl BinaryAccuracy {
    pub fn new(threshold: f64) -> BinaryAccuracy {
        BinaryAccuracy {
            threshold,
            correct: 0,
            total: 0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for BinaryAccuracy {
    fn default() -> Self {
        BinaryAccuracy::new(DEFAULT_THRESHOLD)
    }
}

impl Metric for BinaryAccuracy {
    fn name(&self) -> &str {
        "binary_accuracy"
    }

    fn reset(&mut self) {
        self.correct = 0;
        self.total = 0;
    }

    fn result(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

impl PredictionMetric for BinaryAccuracy {
    fn update(&mut self, y_true: &Matrix, y_pred: &Matrix) -> Result<()> {
        self.check(y_true, y_pred)?;
        let threshold = self.threshold;
        self.correct += y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|&(&t, &p)| {
                let predicted = if p > threshold { 1.0 } else { 0.0 };
                predicted == t
            })
            .count();
        self.total += y_true.len();
        Ok(())
    }
}
