use std::fmt;
use std::sync::Arc;

use crate::lexer::Token;
use crate::parser::Stmt;

/// Runtime value representation
///
/// All typing is done by runtime inspection in the evaluator; values carry
/// no user-visible type tag.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Double-precision number; JMPL has no integer type
    Number(f64),
    /// String value
    String(String),
    /// Callable function value (reference-counted)
    Function(Arc<Function>),
}

/// A user-declared function
#[derive(Debug)]
pub struct Function {
    /// Function name, used for stringification
    pub name: String,
    /// Parameter name tokens
    pub params: Vec<Token>,
    /// Body statements
    pub body: Vec<Stmt>,
}

impl Value {
    /// Returns the type name as a string, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    /// Returns true if the value is truthy in a boolean context
    ///
    /// Null, the empty string and zero are false; booleans yield their own
    /// value; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Function(_) => true,
        }
    }

    /// Converts the value to its output text
    ///
    /// Null prints as `null`; a number whose textual form ends in `.0` has
    /// the suffix stripped, so `3.0` prints as `3` and `3.5` unchanged.
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                let text = n.to_string();
                match text.strip_suffix(".0") {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                }
            }
            Value::String(s) => s.clone(),
            Value::Function(f) => format!("<fn {}>", f.name),
        }
    }
}

impl PartialEq for Value {
    /// Equality is defined for any pair of values: null equals only null,
    /// scalars compare structurally, functions compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.stringify())
    }
}
