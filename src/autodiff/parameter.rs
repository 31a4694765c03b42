use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::math::matrix::Matrix;

static NEXT_PARAM_ID: AtomicUsize = AtomicUsize::new(0);

/// Process-unique identity of a [`Parameter`]; the tape keys gradients by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(usize);

impl ParamId {
    fn next() -> ParamId {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named tensor owned by a layer.
///
/// Only trainable parameters are handed to the optimizer.
#[derive(Debug, Clone)]
pub struct Parameter {
    id: ParamId,
    name: String,
    value: Matrix,
    trainable: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Matrix, trainable: bool) -> Parameter {
        Parameter {
            id: ParamId::next(),
            name: name.into(),
            value,
            trainable,
        }
    }

    pub fn trainable(name: impl Into<String>, value: Matrix) -> Parameter {
        Parameter::new(name, value, true)
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Matrix {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Matrix {
        &mut self.value
    }

    pub fn is_trainable(&self) -> bool {
        self.trainable
    }

    pub fn set_trainable(&mut self, trainable: bool) {
        self.trainable = trainable;
    }
}
