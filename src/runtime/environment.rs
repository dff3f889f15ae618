use std::collections::HashMap;

use crate::error::{Result, RuntimeError};
use crate::lexer::Token;
use crate::runtime::Value;

/// Environment for variable scoping
///
/// A chain of nested scopes held as a stack with explicit parent links.
/// Block scopes parent to the scope that was current when they were
/// entered; function call scopes parent directly to the global scope, so a
/// called body never observes the caller's locals.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Stack of scopes; index 0 is the global scope
    scopes: Vec<Scope>,
}

/// Single scope in the environment
#[derive(Debug, Clone)]
struct Scope {
    /// Variables defined in this scope
    values: HashMap<String, Value>,
    /// Index of the enclosing scope (None for the global scope)
    parent: Option<usize>,
}

impl Environment {
    /// Creates a new environment with a global scope
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope {
                values: HashMap::new(),
                parent: None,
            }],
        }
    }

    /// Enters a new block scope nested under the current one
    pub fn enter_scope(&mut self) {
        let parent = self.scopes.len() - 1;
        self.scopes.push(Scope {
            values: HashMap::new(),
            parent: Some(parent),
        });
    }

    /// Enters a function call scope parented directly at the global scope
    pub fn enter_function_scope(&mut self) {
        self.scopes.push(Scope {
            values: HashMap::new(),
            parent: Some(0),
        });
    }

    /// Exits the current scope, discarding its bindings. The global scope is
    /// never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Defines a variable in the current scope. Always succeeds; redefining
    /// an existing name in the same scope silently overwrites it.
    pub fn define(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(name, value);
        }
    }

    /// Gets the value of a variable, searching the current scope and then
    /// each enclosing scope outward
    pub fn get(&self, name: &Token) -> Result<Value> {
        let mut index = self.scopes.len() - 1;
        loop {
            let scope = &self.scopes[index];
            if let Some(value) = scope.values.get(&name.lexeme) {
                return Ok(value.clone());
            }
            match scope.parent {
                Some(parent) => index = parent,
                None => {
                    return Err(RuntimeError::variable(
                        name.clone(),
                        format!("Undefined variable '{}'", name.lexeme),
                    ))
                }
            }
        }
    }

    /// Assigns to an existing variable in the nearest enclosing scope that
    /// defines it. Never creates a new binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        let mut index = self.scopes.len() - 1;
        loop {
            let scope = &mut self.scopes[index];
            if scope.values.contains_key(&name.lexeme) {
                scope.values.insert(name.lexeme.clone(), value);
                return Ok(());
            }
            match scope.parent {
                Some(parent) => index = parent,
                None => {
                    return Err(RuntimeError::variable(
                        name.clone(),
                        format!("Undefined variable '{}'", name.lexeme),
                    ))
                }
            }
        }
    }
}
