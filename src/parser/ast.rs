use serde::{Deserialize, Serialize};

use crate::lexer::Token;

/// Literal values embedded in the syntax tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// Boolean literal
    Bool(bool),
    /// Null literal
    Null,
}

/// Expressions
///
/// Nodes are immutable after construction; trees are acyclic and owned
/// exclusively by their parent statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal expression
    Literal(LiteralValue),

    /// Parenthesised expression
    Grouping(Box<Expr>),

    /// Unary operation (¬ and unary -)
    Unary {
        /// Operator token
        operator: Token,
        /// Operand expression
        operand: Box<Expr>,
    },

    /// Binary operation
    Binary {
        /// Operator token
        operator: Token,
        /// Left operand expression
        left: Box<Expr>,
        /// Right operand expression
        right: Box<Expr>,
    },

    /// Short-circuiting logical operation (and/or)
    Logical {
        /// Operator token
        operator: Token,
        /// Left operand expression
        left: Box<Expr>,
        /// Right operand expression
        right: Box<Expr>,
    },

    /// Variable reference
    Variable {
        /// Name token of the variable
        name: Token,
    },

    /// Assignment to an existing variable: name := value
    Assign {
        /// Name token of the assignment target
        name: Token,
        /// Expression whose value is assigned
        value: Box<Expr>,
    },

    /// Function call
    Call {
        /// Expression evaluating to the callee
        callee: Box<Expr>,
        /// Closing parenthesis token, used for error reporting
        paren: Token,
        /// Argument expressions in call order
        arguments: Vec<Expr>,
    },
}

/// Statements
///
/// Statement lists are ordered; execution order is sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement: evaluate and discard
    Expression(Expr),

    /// Output statement: evaluate and print
    Output(Expr),

    /// Variable declaration: let name [= initializer];
    Let {
        /// Name token of the variable
        name: Token,
        /// Optional initialiser; the variable defaults to null without one
        initializer: Option<Expr>,
    },

    /// Parenthesis-delimited block of statements
    Block(Vec<Stmt>),

    /// Conditional: if condition then branch [else branch]
    If {
        /// Condition expression, tested for truthiness
        condition: Expr,
        /// Statement executed when the condition is truthy
        then_branch: Box<Stmt>,
        /// Optional statement executed otherwise
        else_branch: Option<Box<Stmt>>,
    },

    /// Loop: while condition do body
    While {
        /// Loop condition expression
        condition: Expr,
        /// Loop body statement
        body: Box<Stmt>,
    },

    /// Function declaration: func name(params) (body)
    Function {
        /// Name token of the function
        name: Token,
        /// Parameter name tokens
        params: Vec<Token>,
        /// Body statements
        body: Vec<Stmt>,
    },

    /// Return statement: return [value];
    Return {
        /// The `return` keyword token, used for error reporting
        keyword: Token,
        /// Optional return value; defaults to null
        value: Option<Expr>,
    },
}
