//! Error and diagnostic types for the JMPL interpreter

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::lexer::Token;

/// Classification of everything a run can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed token, missing expected token, invalid assignment target
    Syntax,
    /// Operand of the wrong runtime kind for an operator
    Type,
    /// Undefined or unassigned-before-use variable name
    Variable,
    /// Division by a zero-valued number
    ZeroDivision,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "Syntax"),
            ErrorKind::Type => write!(f, "Type"),
            ErrorKind::Variable => write!(f, "Variable"),
            ErrorKind::ZeroDivision => write!(f, "ZeroDivision"),
        }
    }
}

/// A reported error, positioned by source line
///
/// Diagnostics are collected and returned by value from `scan`, `parse` and
/// `run` rather than flagged through ambient state, so a long-lived REPL can
/// reuse the pipeline without manual resets.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("[line {line}] {kind} error: {message}")]
pub struct Diagnostic {
    /// Line number where the error occurred (1-indexed)
    pub line: usize,
    /// Error classification
    pub kind: ErrorKind,
    /// Error description
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic
    pub fn new(line: usize, kind: ErrorKind, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            kind,
            message: message.into(),
        }
    }
}

/// Runtime error carrying the token responsible
///
/// **Triggered by:** type mismatches, undefined variables and division by
/// zero during evaluation. The first runtime error aborts the remaining
/// statements of the run.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {}] {kind} error at '{}': {message}", .token.line, .token.lexeme)]
pub struct RuntimeError {
    /// The offending token
    pub token: Token,
    /// Error classification
    pub kind: ErrorKind,
    /// Error description
    pub message: String,
}

impl RuntimeError {
    /// Creates a runtime error of the given kind
    pub fn new(token: Token, kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            kind,
            message: message.into(),
        }
    }

    /// Creates a type error at the given token
    pub fn type_error(token: Token, message: impl Into<String>) -> Self {
        Self::new(token, ErrorKind::Type, message)
    }

    /// Creates an undefined-variable error at the given token
    pub fn variable(token: Token, message: impl Into<String>) -> Self {
        Self::new(token, ErrorKind::Variable, message)
    }

    /// Creates a division-by-zero error at the given token
    pub fn zero_division(token: Token) -> Self {
        Self::new(token, ErrorKind::ZeroDivision, "Division by zero")
    }

    /// Converts this error into a reportable diagnostic
    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic {
            line: self.token.line,
            kind: self.kind,
            message: self.message,
        }
    }
}

/// Result type for JMPL runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
