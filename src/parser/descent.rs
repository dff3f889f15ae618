use super::ast::{Expr, LiteralValue, Stmt};
use crate::error::{Diagnostic, ErrorKind};
use crate::lexer::{Literal, Token, TokenKind};

/// Local unwind signal raised on a parse error and caught at the
/// declaration level. The diagnostic is already recorded when the signal is
/// raised, so the signal itself carries nothing.
struct ParseSignal;

type ParseResult<T> = Result<T, ParseSignal>;

/// Recursive-descent parser for JMPL
///
/// One statement is produced per top-level declaration call, repeated until
/// the `Eof` token. Parse errors are reported as diagnostics and recovered
/// from with panic-mode synchronisation, bounding error cascades to one
/// diagnostic per malformed statement.
pub struct Parser {
    tokens: Vec<Token>,
    /// Pointer to the next token to be parsed
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    /// Creates a new parser over a scanned token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the tokens into a statement list, returning it together with
    /// any diagnostics produced along the way
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(ParseSignal) => self.synchronise(),
            }
        }

        (statements, self.diagnostics)
    }

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(TokenKind::Let) {
            return self.let_declaration();
        }
        if self.match_kind(TokenKind::Func) {
            return self.function_declaration();
        }

        self.statement()
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(TokenKind::If) {
            return self.if_statement();
        }
        if self.match_kind(TokenKind::While) {
            return self.while_statement();
        }
        if self.match_kind(TokenKind::Out) {
            return self.output_statement();
        }
        if self.match_kind(TokenKind::Return) {
            return self.return_statement();
        }
        if self.match_kind(TokenKind::LeftParen) {
            return Ok(Stmt::Block(self.block()?));
        }

        self.expression_statement()
    }

    fn let_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expected variable name")?;

        // Without an '=', the initial value stays null
        let initializer = if self.match_kind(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume_semicolon()?;
        Ok(Stmt::Let { name, initializer })
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expected function name")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.consume(TokenKind::Identifier, "Expected parameter name")?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        self.consume(TokenKind::LeftParen, "Expected '(' before function body")?;
        let body = self.block()?;

        Ok(Stmt::Function { name, params, body })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.expression()?;
        self.consume(TokenKind::Then, "Expected 'then' after condition")?;

        let then_branch = Box::new(self.statement()?);

        // Dangling else binds to the nearest unmatched if
        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let condition = self.expression()?;
        self.consume(TokenKind::Do, "Expected 'do' after condition")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn output_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Output(value))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume_semicolon()?;
        Ok(Stmt::Return { keyword, value })
    }

    /// Parses the declarations of a parenthesis-delimited block, up to and
    /// including the closing ')'. A malformed statement inside the block is
    /// recovered from locally so the rest of the block still parses.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(ParseSignal) => self.synchronise(),
            }
        }

        self.consume(TokenKind::RightParen, "Expected ')' after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Expression(expr))
    }

    /// Starts the expression precedence chain from the bottom
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Assignment is right-associative and only legal on a bare variable
    /// reference. Any other target is reported without unwinding; parsing
    /// continues with the already-parsed expression.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or_expression()?;

        if self.match_kind(TokenKind::Assign) {
            let operator = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable { name } => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),
                other => {
                    self.report(&operator, "Invalid assignment target");
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn or_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and_expression()?;

        while self.match_kind(TokenKind::Or) {
            let operator = self.previous().clone();
            let right = self.and_expression()?;
            expr = Expr::Logical {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn and_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.match_kind(TokenKind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_kinds(&[TokenKind::NotEqual, TokenKind::EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::Binary {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.match_kinds(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::Binary {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.match_kinds(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::Binary {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.match_kinds(&[TokenKind::Slash, TokenKind::Asterisk]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::Binary {
                operator,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_kinds(&[TokenKind::Not, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.match_kind(TokenKind::LeftParen) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.match_kind(TokenKind::False) {
            return Ok(Expr::Literal(LiteralValue::Bool(false)));
        }
        if self.match_kind(TokenKind::True) {
            return Ok(Expr::Literal(LiteralValue::Bool(true)));
        }
        if self.match_kind(TokenKind::Null) {
            return Ok(Expr::Literal(LiteralValue::Null));
        }

        if self.match_kind(TokenKind::Number) {
            let token = self.previous().clone();
            return match token.literal {
                Some(Literal::Number(n)) => Ok(Expr::Literal(LiteralValue::Number(n))),
                _ => Err(self.error_at(&token, "Malformed number literal")),
            };
        }

        if self.match_kind(TokenKind::String) {
            let token = self.previous().clone();
            return match token.literal {
                Some(Literal::String(s)) => Ok(Expr::Literal(LiteralValue::String(s))),
                _ => Err(self.error_at(&token, "Malformed string literal")),
            };
        }

        if self.match_kind(TokenKind::Identifier) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }

        if self.match_kind(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        let token = self.peek().clone();
        Err(self.error_at(&token, "Expression expected"))
    }

    /// Checks if the current token is any of the given kinds and consumes it
    /// on a match
    fn match_kinds(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }

        false
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        self.match_kinds(&[kind])
    }

    /// Consumes the current token if it matches the expected kind, otherwise
    /// reports the given message and raises the unwind signal
    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }

        let token = self.peek().clone();
        Err(self.error_at(&token, message))
    }

    fn consume_semicolon(&mut self) -> ParseResult<()> {
        self.consume(TokenKind::Semicolon, "Expected ';' after value")?;
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    /// Records a diagnostic at the given token without unwinding
    fn report(&mut self, token: &Token, message: &str) {
        self.diagnostics
            .push(Diagnostic::new(token.line, ErrorKind::Syntax, message));
    }

    /// Records a diagnostic and returns the unwind signal for the caller to
    /// raise
    fn error_at(&mut self, token: &Token, message: &str) -> ParseSignal {
        self.report(token, message);
        ParseSignal
    }

    /// Discards tokens until the start of the next statement: just past a
    /// ';', or in front of a statement-starting keyword
    fn synchronise(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Func
                | TokenKind::Let
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Out
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
