//! Tests for scanner and parser error recovery
//!
//! A malformed input should produce bounded, well-positioned diagnostics
//! while the rest of the program still parses. Programs with any syntax
//! diagnostic are never executed.

use jmpl::{run_with_writer, Diagnostic, ErrorKind, Parser, RunOutcome, Scanner, Stmt};

fn run(source: &str) -> (String, RunOutcome) {
    let mut out = Vec::new();
    let outcome = run_with_writer(source, &mut out);
    (String::from_utf8(out).expect("output is UTF-8"), outcome)
}

fn parse(source: &str) -> (Vec<Stmt>, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = Scanner::new(source).scan_tokens();
    let (statements, parse_diagnostics) = Parser::new(tokens).parse();
    diagnostics.extend(parse_diagnostics);
    (statements, diagnostics)
}

#[test]
fn test_unexpected_character_scan_continues() {
    let (statements, diagnostics) = parse("out @ 1;");
    // The '@' is reported and skipped; the rest still scans and parses
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, ErrorKind::Syntax);
    assert!(diagnostics[0].message.contains('@'));
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0], Stmt::Output(_)));
}

#[test]
fn test_unterminated_string_reported() {
    let (_, diagnostics) = parse("out \"never closed;");
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Unterminated string"));
}

#[test]
fn test_unterminated_block_comment_is_silent() {
    let (statements, diagnostics) = parse("out 1; /* runs to end of file");
    assert!(diagnostics.is_empty(), "got: {diagnostics:?}");
    assert_eq!(statements.len(), 1);
}

#[test]
fn test_stray_block_comment_closer_discarded() {
    let (statements, diagnostics) = parse("out 1; */ out 2;");
    assert!(diagnostics.is_empty(), "got: {diagnostics:?}");
    assert_eq!(statements.len(), 2);
}

#[test]
fn test_parser_recovers_at_statement_boundary() {
    let (statements, diagnostics) = parse("let ;  out 1;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Expected variable name");
    assert_eq!(statements.len(), 1);
    assert!(matches!(&statements[0], Stmt::Output(_)));
}

#[test]
fn test_one_diagnostic_per_malformed_statement() {
    let (statements, diagnostics) = parse("out + ; let x = 1; out * ; out x;");
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(statements.len(), 2);
}

#[test]
fn test_recovery_inside_block() {
    let (statements, diagnostics) = parse("(out + ; out 1;)");
    assert_eq!(diagnostics.len(), 1);
    let Stmt::Block(inner) = &statements[0] else {
        panic!("expected block");
    };
    assert_eq!(inner.len(), 1);
}

#[test]
fn test_invalid_assignment_target() {
    let (_, diagnostics) = parse("1 + 2 := 3;");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "Invalid assignment target");
}

#[test]
fn test_syntax_errors_prevent_execution() {
    let (output, outcome) = run("out 1; out + ;");
    assert!(outcome.had_error);
    assert_eq!(output, "", "no statement may run when syntax is broken");
}

#[test]
fn test_missing_then_and_do() {
    let (_, diagnostics) = parse("if x out 1;");
    assert_eq!(diagnostics[0].message, "Expected 'then' after condition");

    let (_, diagnostics) = parse("while x out 1;");
    assert_eq!(diagnostics[0].message, "Expected 'do' after condition");
}

#[test]
fn test_unclosed_block_reported_at_eof() {
    let (_, diagnostics) = parse("(out 1;");
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Expected ')' after block"));
}

#[test]
fn test_diagnostics_carry_lines_across_multiline_input() {
    let (_, diagnostics) = parse("out 1;\nout 2;\nlet ;\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, 3);
}
