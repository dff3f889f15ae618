//! Lexical analysis for JMPL
//!
//! Converts source text into a stream of tokens in a single left-to-right
//! pass, collecting diagnostics instead of halting on malformed input.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Literal, Token, TokenKind};
