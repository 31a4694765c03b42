pub mod model;
pub mod steps;

pub use model::{CompiledModel, Model};
