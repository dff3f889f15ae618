use std::io::Write;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, RuntimeError};
use crate::lexer::{Token, TokenKind};
use crate::parser::{Expr, LiteralValue, Stmt};
use crate::runtime::{Environment, Function, Value};

/// Outcome of executing a single statement
///
/// Non-local `return` is modelled as an explicit completion value checked by
/// every statement-sequence runner instead of an unwinding mechanism, which
/// also handles propagation out of nested blocks and loops.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Execution fell through to the next statement
    Normal,
    /// A `return` was executed, carrying its value
    Return(Value),
}

/// Tree-walking evaluator for JMPL
///
/// Executes parsed statements against a scope-chain [`Environment`],
/// halting on the first runtime error. Output statements write through the
/// supplied writer.
pub struct Evaluator<'a> {
    env: Environment,
    out: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    /// Creates a new evaluator with a fresh global environment, writing
    /// output through `out`
    pub fn new(out: &'a mut dyn Write) -> Self {
        Evaluator {
            env: Environment::new(),
            out,
        }
    }

    /// Executes a statement list against the global environment
    ///
    /// Halts on the first runtime error; a top-level `return` simply ends
    /// the run.
    pub fn execute(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!(statements = statements.len(), "executing program");

        for statement in statements {
            if let Completion::Return(_) = self.execute_stmt(statement)? {
                break;
            }
        }

        Ok(())
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Completion> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Completion::Normal)
            }

            Stmt::Output(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.out, "{}", value.stringify());
                Ok(Completion::Normal)
            }

            Stmt::Let { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                self.env.define(name.lexeme.clone(), value);
                Ok(Completion::Normal)
            }

            Stmt::Block(statements) => self.execute_block(statements),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_stmt(else_branch)
                } else {
                    Ok(Completion::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute_stmt(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
                Ok(Completion::Normal)
            }

            Stmt::Function { name, params, body } => {
                let function = Value::Function(Arc::new(Function {
                    name: name.lexeme.clone(),
                    params: params.clone(),
                    body: body.clone(),
                }));
                self.env.define(name.lexeme.clone(), function);
                Ok(Completion::Normal)
            }

            Stmt::Return { keyword: _, value } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Null,
                };
                Ok(Completion::Return(value))
            }
        }
    }

    /// Executes a block in a fresh child scope. The scope is discarded
    /// whether the block completes, returns or errors.
    fn execute_block(&mut self, statements: &[Stmt]) -> Result<Completion> {
        self.env.enter_scope();
        let result = self.run_sequence(statements);
        self.env.exit_scope();
        result
    }

    /// Runs a statement sequence in the current scope, short-circuiting on
    /// a returning completion
    fn run_sequence(&mut self, statements: &[Stmt]) -> Result<Completion> {
        for statement in statements {
            match self.execute_stmt(statement)? {
                Completion::Normal => {}
                returning => return Ok(returning),
            }
        }
        Ok(Completion::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::String(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Null => Value::Null,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                match operator.kind {
                    TokenKind::Minus => {
                        let n = number_operand(operator, &value)?;
                        Ok(Value::Number(-n))
                    }
                    // Logical negation of truthiness; any operand kind
                    TokenKind::Not => Ok(Value::Bool(!value.is_truthy())),
                    _ => Err(RuntimeError::type_error(
                        operator.clone(),
                        "Unsupported unary operator",
                    )),
                }
            }

            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(operator, left, right)
            }

            Expr::Logical {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;

                // Short-circuit: the right operand is evaluated only when
                // the left does not already decide the result
                if operator.kind == TokenKind::Or {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }

                self.evaluate(right)
            }

            Expr::Variable { name } => self.env.get(name),

            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.env.assign(name, value.clone())?;
                // Assignment is an expression yielding the assigned value
                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                match callee {
                    Value::Function(function) => self.call_function(&function, paren, args),
                    other => Err(RuntimeError::type_error(
                        paren.clone(),
                        format!("Can only call functions, not {}", other.type_name()),
                    )),
                }
            }
        }
    }

    /// Calls a function value in a scope parented at the global scope
    fn call_function(
        &mut self,
        function: &Function,
        paren: &Token,
        args: Vec<Value>,
    ) -> Result<Value> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::type_error(
                paren.clone(),
                format!(
                    "Expected {} arguments but got {}",
                    function.params.len(),
                    args.len()
                ),
            ));
        }

        self.env.enter_function_scope();
        for (param, arg) in function.params.iter().zip(args) {
            self.env.define(param.lexeme.clone(), arg);
        }

        let completion = self.run_sequence(&function.body);
        self.env.exit_scope();

        match completion? {
            Completion::Return(value) => Ok(value),
            Completion::Normal => Ok(Value::Null),
        }
    }

    fn binary(&mut self, operator: &Token, left: Value, right: Value) -> Result<Value> {
        match operator.kind {
            TokenKind::Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                // Either operand being a string coerces both to text
                (a, b) if matches!(&a, Value::String(_)) || matches!(&b, Value::String(_)) => {
                    Ok(Value::String(a.stringify() + &b.stringify()))
                }
                _ => Err(RuntimeError::type_error(
                    operator.clone(),
                    "Operands must be numbers or strings",
                )),
            },

            TokenKind::Minus => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }
            TokenKind::Asterisk => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }
            TokenKind::Slash => {
                // Zero divisor is its own error, checked before the operand
                // type check
                if matches!(&right, Value::Number(n) if *n == 0.0) {
                    return Err(RuntimeError::zero_division(operator.clone()));
                }
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a / b))
            }

            TokenKind::Greater => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a > b))
            }
            TokenKind::GreaterEqual => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }
            TokenKind::Less => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a < b))
            }
            TokenKind::LessEqual => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenKind::EqualEqual => Ok(Value::Bool(left == right)),
            TokenKind::NotEqual => Ok(Value::Bool(left != right)),

            _ => Err(RuntimeError::type_error(
                operator.clone(),
                "Unsupported binary operator",
            )),
        }
    }
}

/// Checks a unary operand is a number
fn number_operand(operator: &Token, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::type_error(
            operator.clone(),
            "Operand must be a number",
        )),
    }
}

/// Checks both binary operands are numbers
fn number_operands(operator: &Token, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::type_error(
            operator.clone(),
            "Operands must be numbers",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    /// Runs a source snippet end to end, returning the captured output and
    /// the execution result
    fn run(source: &str) -> (String, Result<()>) {
        let (tokens, scan_diags) = Scanner::new(source).scan_tokens();
        assert!(scan_diags.is_empty(), "scan errors: {scan_diags:?}");
        let (statements, parse_diags) = Parser::new(tokens).parse();
        assert!(parse_diags.is_empty(), "parse errors: {parse_diags:?}");

        let mut out = Vec::new();
        let result = Evaluator::new(&mut out).execute(&statements);
        (String::from_utf8(out).unwrap_or_default(), result)
    }

    fn run_ok(source: &str) -> String {
        let (output, result) = run(source);
        result.expect("execution failed");
        output
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(run_ok("out 1 + 2 * 3;"), "7\n");
        assert_eq!(run_ok("out (1 + 2) * 3;"), "9\n");
    }

    #[test]
    fn test_string_coercion_on_plus() {
        assert_eq!(run_ok("out \"a\" + 1;"), "a1\n");
        assert_eq!(run_ok("out 1 + \"2\";"), "12\n");
        assert_eq!(run_ok("out 1 + 2;"), "3\n");
        assert_eq!(run_ok("out \"n=\" + null;"), "n=null\n");
    }

    #[test]
    fn test_division_by_zero_aborts() {
        let (output, result) = run("out 1/0; out 2;");
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ZeroDivision);
        assert_eq!(output, "");
    }

    #[test]
    fn test_zero_divisor_checked_before_type() {
        let (_, result) = run("out \"a\" / 0;");
        assert_eq!(result.unwrap_err().kind, ErrorKind::ZeroDivision);
    }

    #[test]
    fn test_comparison_requires_numbers() {
        let (_, result) = run("out \"a\" > 1;");
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.message, "Operands must be numbers");
    }

    #[test]
    fn test_equality_is_total() {
        assert_eq!(run_ok("out null == null;"), "true\n");
        assert_eq!(run_ok("out null == 0;"), "false\n");
        assert_eq!(run_ok("out 1 == \"1\";"), "false\n");
        assert_eq!(run_ok("out \"a\" ¬= \"b\";"), "true\n");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(run_ok("out -3;"), "-3\n");
        assert_eq!(run_ok("out not 0;"), "true\n");
        assert_eq!(run_ok("out not \"x\";"), "false\n");
        let (_, result) = run("out -\"a\";");
        assert_eq!(result.unwrap_err().message, "Operand must be a number");
    }

    #[test]
    fn test_logical_short_circuit_yields_operand() {
        assert_eq!(run_ok("out 0 or 2;"), "2\n");
        assert_eq!(run_ok("out 1 or 2;"), "1\n");
        assert_eq!(run_ok("out 0 and 2;"), "0\n");
        assert_eq!(run_ok("out 1 and 2;"), "2\n");
        // The right operand must not be evaluated when the left decides
        assert_eq!(run_ok("out 0 and 1/0;"), "0\n");
        assert_eq!(run_ok("out 1 or 1/0;"), "1\n");
    }

    #[test]
    fn test_assignment_is_an_expression() {
        assert_eq!(run_ok("let x = 1; out x := 5;"), "5\n");
    }

    #[test]
    fn test_assignment_writes_nearest_defining_scope() {
        assert_eq!(run_ok("let x = 1; (x := 2;) out x;"), "2\n");
    }

    #[test]
    fn test_assign_undefined_is_variable_error() {
        let (_, result) = run("y := 5;");
        assert_eq!(result.unwrap_err().kind, ErrorKind::Variable);
    }

    #[test]
    fn test_if_truthiness() {
        assert_eq!(run_ok("if 0 then out 1; else out 2;"), "2\n");
        assert_eq!(run_ok("if \"\" then out 1; else out 2;"), "2\n");
        assert_eq!(run_ok("if \"x\" then out 1; else out 2;"), "1\n");
        assert_eq!(run_ok("if null then out 1;"), "");
    }

    #[test]
    fn test_while_loop() {
        assert_eq!(
            run_ok("let i = 0; while i < 3 do (out i; i := i + 1;)"),
            "0\n1\n2\n"
        );
    }

    #[test]
    fn test_block_scope_shadowing() {
        assert_eq!(
            run_ok("let x = 1; (let x = 2; out x;) out x;"),
            "2\n1\n"
        );
    }

    #[test]
    fn test_scope_popped_after_runtime_error() {
        // The error propagates out of the block; the evaluator must still
        // be usable against the outer scope afterwards
        let (tokens, _) = Scanner::new("let x = 1; (let x = 2; out 1/0;)").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        let mut out = Vec::new();
        let mut evaluator = Evaluator::new(&mut out);
        assert!(evaluator.execute(&statements).is_err());

        let (tokens, _) = Scanner::new("out x;").scan_tokens();
        let (statements, _) = Parser::new(tokens).parse();
        evaluator.execute(&statements).expect("outer scope intact");
    }

    #[test]
    fn test_function_call_and_return() {
        assert_eq!(
            run_ok("func add(a, b) (return a + b;) out add(1, 2);"),
            "3\n"
        );
    }

    #[test]
    fn test_function_without_return_yields_null() {
        assert_eq!(run_ok("func f() (out 1;) out f();"), "1\nnull\n");
    }

    #[test]
    fn test_arity_mismatch_is_type_error() {
        let (_, result) = run("func f(a) (return a;) f(1, 2);");
        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.message, "Expected 1 arguments but got 2");
    }

    #[test]
    fn test_calling_non_function_is_type_error() {
        let (_, result) = run("let x = 1; x();");
        assert_eq!(result.unwrap_err().kind, ErrorKind::Type);
    }

    #[test]
    fn test_return_short_circuits_nested_blocks_and_loops() {
        assert_eq!(
            run_ok(
                "func f() (while true do (return 42;) out \"unreachable\";) \
                 out f();"
            ),
            "42\n"
        );
    }

    #[test]
    fn test_call_scope_parents_at_global() {
        // The callee sees the global x, not the caller's block-local shadow
        assert_eq!(
            run_ok("let x = 1; func f() (out x;) (let x = 2; f();)"),
            "1\n"
        );
    }

    #[test]
    fn test_recursion() {
        assert_eq!(
            run_ok(
                "func fib(n) (if n < 2 then return n; return fib(n - 1) + fib(n - 2);) \
                 out fib(10);"
            ),
            "55\n"
        );
    }

    #[test]
    fn test_top_level_return_ends_run() {
        assert_eq!(run_ok("out 1; return; out 2;"), "1\n");
    }
}
