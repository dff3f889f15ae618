use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed literal payload carried by `NUMBER` and `STRING` tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Numeric literal; all numbers are double-precision
    Number(f64),
    /// String literal with the quotes stripped
    String(String),
}

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Typed literal value, present only for number and string tokens
    pub literal: Option<Literal>,
    /// Line number where the token appears (1-indexed)
    pub line: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, literal: Option<Literal>, line: usize) -> Self {
        Token {
            kind,
            lexeme,
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.literal {
            Some(Literal::Number(n)) => write!(f, "{:?} {} {}", self.kind, self.lexeme, n),
            Some(Literal::String(s)) => write!(f, "{:?} {} {}", self.kind, self.lexeme, s),
            None => write!(f, "{:?} {}", self.kind, self.lexeme),
        }
    }
}

/// All possible token types in JMPL
///
/// Several keywords have a one-character Unicode alias produced by the
/// scanner (`∧`→`And`, `∨`→`Or`, `¬`→`Not`, `∈`→`In`, `≠`→`NotEqual`,
/// `≥`→`GreaterEqual`, `≤`→`LessEqual`). Alias and keyword map to the same
/// kind and are never distinguished downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Single-character tokens
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left brace {
    LeftBrace,
    /// Right brace }
    RightBrace,
    /// Left square bracket [
    LeftSquare,
    /// Right square bracket ]
    RightSquare,
    /// Comma delimiter
    Comma,
    /// Dot
    Dot,
    /// Minus operator (-)
    Minus,
    /// Plus operator (+)
    Plus,
    /// Slash operator (/)
    Slash,
    /// Asterisk operator (*)
    Asterisk,
    /// Caret (^)
    Caret,
    /// Percent (%)
    Percent,
    /// Semicolon delimiter
    Semicolon,
    /// Colon (:)
    Colon,
    /// Pipe (|)
    Pipe,
    /// Hashtag (#)
    Hashtag,
    /// Maps-to arrow (→)
    MapsTo,
    /// Implication arrow (⇒)
    Implies,

    // One or two character tokens
    /// Assignment operator (:=)
    Assign,
    /// Equals (=), used in let initialisers
    Equal,
    /// Equality operator (==)
    EqualEqual,
    /// Logical NOT (¬ or the `not` keyword)
    Not,
    /// Inequality operator (¬= or ≠)
    NotEqual,
    /// Greater than operator (>)
    Greater,
    /// Greater than or equal operator (>=)
    GreaterEqual,
    /// Less than operator (<)
    Less,
    /// Less than or equal operator (<=)
    LessEqual,

    // Literals
    /// Identifier
    Identifier,
    /// String literal
    String,
    /// Numeric literal
    Number,

    // Keywords
    /// Logical AND (`and` or ∧)
    And,
    /// Logical OR (`or` or ∨)
    Or,
    /// Boolean true literal
    True,
    /// Boolean false literal
    False,
    /// LET keyword
    Let,
    /// Null literal
    Null,
    /// IF keyword
    If,
    /// THEN keyword
    Then,
    /// ELSE keyword
    Else,
    /// WHILE keyword
    While,
    /// DO keyword
    Do,
    /// OUT keyword
    Out,
    /// FUNC keyword
    Func,
    /// RETURN keyword
    Return,
    /// Membership keyword (`in` or ∈)
    In,

    // Special
    /// End of file marker
    Eof,
}

impl TokenKind {
    /// Reserved-word lookup, applied only after a full identifier has been
    /// scanned. Identifiers that match no keyword stay `Identifier`.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "and" => Some(TokenKind::And),
            "or" => Some(TokenKind::Or),
            "not" => Some(TokenKind::Not),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "let" => Some(TokenKind::Let),
            "null" => Some(TokenKind::Null),
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "do" => Some(TokenKind::Do),
            "out" => Some(TokenKind::Out),
            "func" => Some(TokenKind::Func),
            "return" => Some(TokenKind::Return),
            "in" => Some(TokenKind::In),
            _ => None,
        }
    }
}
