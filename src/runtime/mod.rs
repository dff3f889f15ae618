//! JMPL runtime module
//!
//! Tree-walking evaluation of the parsed program: runtime values, the
//! scope-chain environment and the evaluator itself.

mod environment;
mod evaluator;
mod value;

pub use environment::Environment;
pub use evaluator::{Completion, Evaluator};
pub use value::{Function, Value};
