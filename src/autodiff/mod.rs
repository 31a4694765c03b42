pub mod parameter;
pub mod tape;

pub use parameter::{ParamId, Parameter};
pub use tape::{Tape, Var};
