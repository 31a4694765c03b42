pub mod bce;

pub use bce::BinaryCrossEntropy;

use crate::autodiff::tape::{Tape, Var};
use crate::error::Result;

/// A scalar objective recorded on a tape so it can be differentiated.
pub trait Loss {
    fn name(&self) -> &str;

    /// Records the loss of `y_pred` against `y_true` and returns a 1×1 value.
    fn compute(&self, tape: &mut Tape, y_true: Var, y_pred: Var) -> Result<Var>;
}
