use super::token::{Literal, Token, TokenKind};
use crate::error::{Diagnostic, ErrorKind};

/// Single-pass scanner for JMPL source text
///
/// Scanning never aborts: malformed input is reported as a diagnostic and
/// the scan resumes, so every error in a source file is surfaced in one
/// pass. The returned token stream always ends with a single `Eof` token.
pub struct Scanner {
    /// Source code as character vector (identifiers may be Greek)
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Diagnostics collected along the way
    diagnostics: Vec<Diagnostic>,
    /// Start position of the current lexeme
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
}

impl Scanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans all tokens from the source and returns them together with any
    /// diagnostics produced along the way
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while !self.is_at_end() {
            // At the beginning of a lexeme
            self.start = self.current;
            self.scan_token();
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, String::new(), None, self.line));

        (self.tokens, self.diagnostics)
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            // Whitespace
            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            // Single-character tokens
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftSquare),
            ']' => self.add_token(TokenKind::RightSquare),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            '^' => self.add_token(TokenKind::Caret),
            '%' => self.add_token(TokenKind::Percent),
            ';' => self.add_token(TokenKind::Semicolon),
            '|' => self.add_token(TokenKind::Pipe),
            '#' => self.add_token(TokenKind::Hashtag),

            // Unicode aliases map to the same kind as their keyword form
            '∈' => self.add_token(TokenKind::In),
            '∧' => self.add_token(TokenKind::And),
            '∨' => self.add_token(TokenKind::Or),
            '≠' => self.add_token(TokenKind::NotEqual),
            '≥' => self.add_token(TokenKind::GreaterEqual),
            '≤' => self.add_token(TokenKind::LessEqual),
            '→' => self.add_token(TokenKind::MapsTo),
            '⇒' => self.add_token(TokenKind::Implies),

            // One or two character tokens: look ahead exactly one character
            ':' => {
                let kind = if self.match_char('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '¬' => {
                let kind = if self.match_char('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Not
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }

            // '/' may start a comment
            '/' => {
                if self.match_char('/') {
                    self.line_comment();
                } else if self.match_char('*') {
                    self.block_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            // A stray block-comment closer is discarded
            '*' => {
                if !self.match_char('/') {
                    self.add_token(TokenKind::Asterisk);
                }
            }

            // Literals
            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if is_alpha(c) => self.identifier(),

            _ => {
                self.error(format!("Unexpected character: '{c}'"));
            }
        }
    }

    /// Consumes a `//` comment to the end of the line
    fn line_comment(&mut self) {
        while self.peek() != '\n' && !self.is_at_end() {
            self.advance();
        }
    }

    /// Consumes a `/* ... */` comment, tracking embedded newlines. An
    /// unterminated block comment is accepted silently and consumes the rest
    /// of the input.
    fn block_comment(&mut self) {
        while !(self.peek() == '*' && self.peek_next() == '/') && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if !self.is_at_end() {
            // Consume the closing pair
            self.advance();
            self.advance();
        }
    }

    /// Scans a string literal. No escape sequences are recognised; newlines
    /// inside a string are allowed and counted.
    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.error("Unterminated string".to_string());
            return;
        }

        // Consume the closing "
        self.advance();

        let value: String = self.source[self.start + 1..self.current - 1]
            .iter()
            .collect();
        self.add_literal_token(TokenKind::String, Some(Literal::String(value)));
    }

    /// Scans a numeric literal. All numbers parse as doubles; a trailing `.`
    /// not followed by a digit is left unconsumed.
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // Fractional part only when the '.' is followed by another digit
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        match text.parse::<f64>() {
            Ok(value) => self.add_literal_token(TokenKind::Number, Some(Literal::Number(value))),
            Err(_) => self.error(format!("Invalid number: {text}")),
        }
    }

    /// Scans an identifier and promotes it to a keyword on an exact match
    fn identifier(&mut self) {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);

        self.add_token(kind);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, None);
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn error(&mut self, message: String) {
        self.diagnostics
            .push(Diagnostic::new(self.line, ErrorKind::Syntax, message));
    }
}

/// Valid first characters for identifiers: Latin letters, Greek letters and
/// underscore. Accented letters are unsupported.
fn is_alpha(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_uppercase()
        || ('α'..='ω').contains(&c)
        || ('Α'..='Ω').contains(&c)
        || c == '_'
}

/// Valid continuation characters for identifiers
fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        Scanner::new(source).scan_tokens()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = scan(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_let_statement() {
        assert_eq!(
            kinds("let x = 5;"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_character_operators() {
        assert_eq!(
            kinds(":= == ¬= >= <= = : ¬ > <"),
            vec![
                TokenKind::Assign,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Equal,
                TokenKind::Colon,
                TokenKind::Not,
                TokenKind::Greater,
                TokenKind::Less,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_aliases_map_to_keyword_kinds() {
        assert_eq!(
            kinds("∧ ∨ ¬ ∈ ≠ ≥ ≤"),
            kinds("and or not in ¬= >= <=")
        );
    }

    #[test]
    fn test_number_literals() {
        let (tokens, diagnostics) = scan("3 3.5 0.25");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.0)));
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.5)));
        assert_eq!(tokens[2].literal, Some(Literal::Number(0.25)));
    }

    #[test]
    fn test_trailing_dot_is_not_consumed() {
        let (tokens, diagnostics) = scan("123.");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(123.0)));
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn test_string_literal() {
        let (tokens, diagnostics) = scan("\"hello world\"");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(
            tokens[0].literal,
            Some(Literal::String("hello world".to_string()))
        );
    }

    #[test]
    fn test_unterminated_string_reports_and_continues() {
        let (tokens, diagnostics) = scan("\"open");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, ErrorKind::Syntax);
        assert_eq!(diagnostics[0].message, "Unterminated string");
        // Only the EOF token survives; the scan still terminates cleanly
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_string_spanning_newlines_counts_lines() {
        let (tokens, _) = scan("\"a\nb\" out");
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn test_line_comment_is_discarded() {
        assert_eq!(
            kinds("// nothing here\nout"),
            vec![TokenKind::Out, TokenKind::Eof]
        );
    }

    #[test]
    fn test_block_comment_counts_lines() {
        let (tokens, diagnostics) = scan("/* one\ntwo\nthree */ x");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn test_unterminated_block_comment_is_silent() {
        let (tokens, diagnostics) = scan("out 1; /* runs to the end");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_greek_identifiers() {
        let (tokens, diagnostics) = scan("αβ_1 Δx");
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].lexeme, "αβ_1");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "Δx");
    }

    #[test]
    fn test_unexpected_character_is_skipped() {
        let (tokens, diagnostics) = scan("let @ x;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains('@'));
        // The rest of the source is still scanned
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_keyword_requires_exact_match() {
        let (tokens, _) = scan("output lets iff");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_eof_carries_final_line() {
        let (tokens, _) = scan("1;\n2;\n");
        assert_eq!(tokens.last().map(|t| t.line), Some(3));
    }

    #[test]
    fn test_stray_comment_closer_is_dropped() {
        assert_eq!(kinds("*/ 1"), vec![TokenKind::Number, TokenKind::Eof]);
        assert_eq!(
            kinds("2 * 3"),
            vec![
                TokenKind::Number,
                TokenKind::Asterisk,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }
}
