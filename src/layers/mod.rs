pub mod affine;
pub mod dropout;
pub mod layer;

pub use affine::WeightedAffine;
pub use dropout::Dropout;
pub use layer::{Layer, Mode};
