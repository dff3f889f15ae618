//! JMPL parser module
//!
//! Converts the scanned token stream into an abstract syntax tree using
//! recursive descent with panic-mode error recovery.

mod ast;
mod descent;

pub use ast::{Expr, LiteralValue, Stmt};
pub use descent::Parser;
