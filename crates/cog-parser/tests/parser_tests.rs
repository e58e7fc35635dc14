//! Parser tests for Cog.
//!
//! Covers: full units, symbol declarations (defaults, extensions),
//! handlers, statements (assignment, calls, if/else, while, return,
//! sleep, waitfor), expression precedence, and error recovery.

use cog_lexer::Lexer;
use cog_parser::{ParseResult, Parser};
use cog_types::ast::*;
use cog_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse source and return the result (unit + errors).
fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.cog", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the unit, panicking on errors.
fn parse_ok(source: &str) -> Unit {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.unit.expect("no unit returned")
}

/// Parse and return the error count.
fn error_count(source: &str) -> usize {
    parse(source).errors.total_errors
}

/// Wrap a `code` body in a minimal unit with one `activated` message.
fn unit_with_body(body: &str) -> String {
    format!("symbols\nmessage activated\nend\ncode\nactivated:\n{body}\nend")
}

// ─────────────────────────────────────────────────────────────────────
// Units & symbols
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_unit() {
    let unit = parse_ok("symbols\nend\ncode\nend");
    assert!(unit.symbols.is_empty());
    assert!(unit.handlers.is_empty());
}

#[test]
fn test_symbol_declarations() {
    let unit = parse_ok(
        "symbols\n\
         message activated\n\
         int     counter=0\n\
         float   delay=2.0\n\
         flex    speed=-0.5\n\
         vector  spawn_pos='1 2 3'\n\
         end\n\
         code\nend",
    );
    assert_eq!(unit.symbols.len(), 5);
    assert_eq!(unit.symbols[0].ty, SymbolType::Message);
    assert_eq!(unit.symbols[0].name.name, "activated");
    assert_eq!(unit.symbols[1].default.as_ref().unwrap().kind, LiteralKind::Int(0));
    assert_eq!(
        unit.symbols[3].default.as_ref().unwrap().kind,
        LiteralKind::Float(-0.5)
    );
    assert_eq!(
        unit.symbols[4].default.as_ref().unwrap().kind,
        LiteralKind::Vector(1.0, 2.0, 3.0)
    );
}

#[test]
fn test_declaration_extensions() {
    let unit = parse_ok(
        "symbols\nint slot=3 local mask=0x40\nend\ncode\nend",
    );
    let exts = &unit.symbols[0].extensions;
    assert_eq!(exts.len(), 2);
    assert_eq!(exts[0].name.name, "local");
    assert!(exts[0].value.is_none());
    assert_eq!(exts[1].name.name, "mask");
    assert_eq!(exts[1].value.as_ref().unwrap().kind, LiteralKind::Int(0x40));
}

#[test]
fn test_message_default_is_error() {
    assert_eq!(error_count("symbols\nmessage activated=1\nend\ncode\nend"), 1);
}

#[test]
fn test_missing_symbols_section_is_error() {
    assert!(error_count("code\nend") > 0);
}

#[test]
fn test_unknown_symbol_type_recovers_to_next_line() {
    let result = parse(
        "symbols\nthing player\nint counter=0\nend\ncode\nend",
    );
    assert_eq!(result.errors.total_errors, 1);
    let unit = result.unit.expect("unit should survive recovery");
    assert_eq!(unit.symbols.len(), 1);
    assert_eq!(unit.symbols[0].name.name, "counter");
}

// ─────────────────────────────────────────────────────────────────────
// Handlers & statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_handler_bodies_split_at_labels() {
    let unit = parse_ok(
        "symbols\nmessage activated\nmessage pulse\nint n=0\nend\n\
         code\n\
         activated:\n    n = 1;\n    return;\n\
         pulse:\n    n = 2;\n\
         end",
    );
    assert_eq!(unit.handlers.len(), 2);
    assert_eq!(unit.handlers[0].label.name, "activated");
    assert_eq!(unit.handlers[0].body.len(), 2);
    assert_eq!(unit.handlers[1].label.name, "pulse");
    assert_eq!(unit.handlers[1].body.len(), 1);
}

#[test]
fn test_assignment_and_call_statements() {
    let unit = parse_ok(&unit_with_body("n = 3;\nSetPulse(1.5, n);"));
    let body = &unit.handlers[0].body;
    assert!(matches!(&body[0].kind, StmtKind::Assign { target, .. } if target.name == "n"));
    match &body[1].kind {
        StmtKind::Call { name, args } => {
            assert_eq!(name.name, "SetPulse");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call statement, got {other:?}"),
    }
}

#[test]
fn test_if_else_with_blocks() {
    let unit = parse_ok(&unit_with_body(
        "if (n > 2)\n{\n    n = 0;\n    Signal(n);\n}\nelse\n    n = n + 1;",
    ));
    match &unit.handlers[0].body[0].kind {
        StmtKind::If {
            then_body,
            else_body,
            ..
        } => {
            assert_eq!(then_body.len(), 2);
            assert_eq!(else_body.as_ref().unwrap().len(), 1);
        }
        other => panic!("expected if statement, got {other:?}"),
    }
}

#[test]
fn test_while_loop() {
    let unit = parse_ok(&unit_with_body("while (n < 10)\n    n = n + 1;"));
    assert!(matches!(
        &unit.handlers[0].body[0].kind,
        StmtKind::While { .. }
    ));
}

#[test]
fn test_sleep_and_waitfor() {
    let unit = parse_ok(&unit_with_body("sleep(2.0);\nwaitfor(activated);"));
    let body = &unit.handlers[0].body;
    assert!(matches!(&body[0].kind, StmtKind::Sleep(_)));
    assert!(
        matches!(&body[1].kind, StmtKind::Waitfor(label) if label.name == "activated")
    );
}

#[test]
fn test_statement_spanning_lines() {
    // Newlines are insignificant inside code.
    let unit = parse_ok(&unit_with_body("n = n +\n    1 *\n    2;"));
    assert_eq!(unit.handlers[0].body.len(), 1);
}

#[test]
fn test_missing_semicolon_recovers() {
    let result = parse(&unit_with_body("n = 1\nSignal(n);"));
    assert!(result.errors.has_errors());
    assert!(result.unit.is_some());
}

// ─────────────────────────────────────────────────────────────────────
// Expression precedence
// ─────────────────────────────────────────────────────────────────────

/// Extract the single assignment's value expression from a one-statement
/// handler body.
fn expr_of(body: &str) -> Expr {
    let unit = parse_ok(&unit_with_body(body));
    match &unit.handlers[0].body[0].kind {
        StmtKind::Assign { value, .. } => value.clone(),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_mul_binds_tighter_than_add() {
    let e = expr_of("n = 1 + 2 * 3;");
    match e.kind {
        ExprKind::Binary { op, right, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_comparison_binds_tighter_than_logic() {
    let e = expr_of("n = a < b && c >= d;");
    match e.kind {
        ExprKind::Binary { op, left, right } => {
            assert_eq!(op, BinaryOp::LogAnd);
            assert!(matches!(
                left.kind,
                ExprKind::Binary {
                    op: BinaryOp::Less,
                    ..
                }
            ));
            assert!(matches!(
                right.kind,
                ExprKind::Binary {
                    op: BinaryOp::GreaterEq,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_bitwise_binds_tighter_than_comparison() {
    let e = expr_of("n = flags & 0x40 == 0;");
    // `flags & 0x40` groups first, then `== 0`.
    match e.kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::Eq);
            assert!(matches!(
                left.kind,
                ExprKind::Binary {
                    op: BinaryOp::BitAnd,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_parens_override_precedence() {
    let e = expr_of("n = (1 + 2) * 3;");
    match e.kind {
        ExprKind::Binary { op, left, .. } => {
            assert_eq!(op, BinaryOp::Mul);
            assert!(matches!(
                left.kind,
                ExprKind::Binary {
                    op: BinaryOp::Add,
                    ..
                }
            ));
        }
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_unary_chain() {
    let e = expr_of("n = !-n;");
    match e.kind {
        ExprKind::Unary { op, operand } => {
            assert_eq!(op, UnaryOp::Not);
            assert!(matches!(
                operand.kind,
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    ..
                }
            ));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn test_call_in_expression() {
    let e = expr_of("n = GetHealth(sender) + 1;");
    match e.kind {
        ExprKind::Binary { left, .. } => match &left.kind {
            ExprKind::Call { name, args } => {
                assert_eq!(name.name, "GetHealth");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected call, got {other:?}"),
        },
        other => panic!("expected binary, got {other:?}"),
    }
}

#[test]
fn test_parse_is_deterministic() {
    let src = unit_with_body("n = 1 + 2 * 3;\nsleep(1.0);");
    let first = parse_ok(&src);
    for _ in 0..20 {
        assert_eq!(parse_ok(&src), first);
    }
}
