use crate::error::{Error, Result};

/// Configuration for a `fit` run.
///
/// # Fields
/// - `epochs`    : total number of full passes over the training data
/// - `batch_size`: rows per batch; the last batch of an epoch may be shorter
/// - `shuffle`   : reorder the training rows before every epoch
/// - `seed`      : seeds the shuffling generator
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl FitConfig {
    /// Creates an unshuffled `FitConfig`.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        FitConfig {
            epochs,
            batch_size,
            shuffle: false,
            seed: 0,
        }
    }

    pub fn shuffled(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        Ok(())
    }
}
