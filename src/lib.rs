//! # JMPL Interpreter
//!
//! A tree-walking interpreter for JMPL, a small expression language with a
//! mathematically flavoured surface syntax. Operators have Unicode aliases
//! (`∧` for `and`, `¬=` for `!=`, `≥` for `>=`), identifiers may use Greek
//! letters, and blocks are parenthesised.
//!
//! ## Example
//!
//! ```
//! use jmpl::run_with_writer;
//!
//! let mut out = Vec::new();
//! let outcome = run_with_writer("let x = 3; out x * x + 1;", &mut out);
//! assert!(!outcome.had_error);
//! assert_eq!(String::from_utf8(out).unwrap(), "10\n");
//! ```
//!
//! ## Pipeline
//!
//! Source text is scanned into tokens ([`Scanner`]), parsed into an AST by
//! recursive descent ([`Parser`]), then executed by a tree-walking
//! [`Evaluator`]. Scanning and parsing collect diagnostics instead of
//! failing fast; execution only begins when the program is syntactically
//! clean and halts on the first runtime error.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

pub use error::{Diagnostic, ErrorKind, RuntimeError};
pub use lexer::{Literal, Scanner, Token, TokenKind};
pub use parser::{Expr, LiteralValue, Parser, Stmt};
pub use runtime::{Completion, Environment, Evaluator, Function, Value};

use std::io::Write;

use tracing::debug;

/// Version of the JMPL interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of running a piece of JMPL source
///
/// Diagnostics are returned by value rather than reported through shared
/// state, so callers decide where they go.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Every diagnostic produced, in source order: scan and parse
    /// diagnostics first, then at most one runtime diagnostic
    pub diagnostics: Vec<Diagnostic>,
    /// True if any diagnostic was produced
    pub had_error: bool,
}

/// Runs JMPL source, writing output to stdout
pub fn run(source: &str) -> RunOutcome {
    let mut stdout = std::io::stdout();
    run_with_writer(source, &mut stdout)
}

/// Runs JMPL source, writing output through the supplied writer
///
/// Scans and parses the whole input, collecting every diagnostic. If the
/// program is syntactically clean it is executed; a runtime error stops
/// execution and is appended as a final diagnostic.
pub fn run_with_writer(source: &str, out: &mut dyn Write) -> RunOutcome {
    let (tokens, mut diagnostics) = Scanner::new(source).scan_tokens();
    debug!(tokens = tokens.len(), "scanned source");

    let (statements, parse_diagnostics) = Parser::new(tokens).parse();
    diagnostics.extend(parse_diagnostics);
    debug!(
        statements = statements.len(),
        diagnostics = diagnostics.len(),
        "parsed source"
    );

    if diagnostics.is_empty() {
        if let Err(error) = Evaluator::new(out).execute(&statements) {
            debug!(%error, "execution aborted");
            diagnostics.push(error.into_diagnostic());
        }
    }

    let had_error = !diagnostics.is_empty();
    RunOutcome {
        diagnostics,
        had_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(source: &str) -> (String, RunOutcome) {
        let mut out = Vec::new();
        let outcome = run_with_writer(source, &mut out);
        (String::from_utf8(out).unwrap_or_default(), outcome)
    }

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let (output, outcome) = capture("out 1 + 2;");
        assert!(!outcome.had_error);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_syntax_errors_skip_execution() {
        let (output, outcome) = capture("let = 1; out 2;");
        assert!(outcome.had_error);
        assert_eq!(output, "");
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.kind == ErrorKind::Syntax));
    }

    #[test]
    fn test_runtime_error_is_final_diagnostic() {
        let (output, outcome) = capture("out 1; out 1/0; out 2;");
        assert!(outcome.had_error);
        assert_eq!(output, "1\n");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].kind, ErrorKind::ZeroDivision);
    }

    #[test]
    fn test_diagnostic_rendering() {
        let (_, outcome) = capture("out missing;");
        assert_eq!(
            outcome.diagnostics[0].to_string(),
            "[line 1] Variable error: Undefined variable 'missing'"
        );
    }
}
