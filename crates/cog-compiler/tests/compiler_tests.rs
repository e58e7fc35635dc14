//! End-to-end compiler tests: source in, Script (or diagnostics) out.
//!
//! Covers: symbol table layout, message entry points, emitted bytecode
//! shapes, constant substitution, verb binding, and every resolver and
//! codegen error code.

use cog_compiler::{CompileOutput, Compiler};
use cog_script::{ConstantTable, Instr, MessageId, Script, Value, ValueKind, VerbTable};
use cog_types::ast::{BinaryOp, SymbolType};
use cog_types::{CompileErrors, ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn verbs() -> VerbTable {
    let mut table = VerbTable::new();
    table.register("SetPulse", vec![ValueKind::Float], None, |_| Ok(None));
    table.register(
        "GetSectorLight",
        vec![ValueKind::Int],
        Some(ValueKind::Float),
        |_| Ok(Some(Value::Float(0.5))),
    );
    table.register("Rand", vec![], Some(ValueKind::Float), |_| {
        Ok(Some(Value::Float(0.25)))
    });
    table
}

fn constants() -> ConstantTable {
    let mut table = ConstantTable::new();
    table.register("damage_fire", Value::Int(0x4));
    table
}

fn compile(source: &str) -> Result<CompileOutput, CompileErrors> {
    let verbs = verbs();
    let constants = constants();
    let sf = SourceFile::new("test.cog", source);
    Compiler::new(&verbs, &constants).compile(&sf)
}

fn compile_ok(source: &str) -> Script {
    match compile(source) {
        Ok(output) => output.script,
        Err(errors) => {
            for e in &errors.errors {
                eprintln!("  ERROR: {} ({})", e.message, e.code);
            }
            panic!("unexpected compile errors (see above)");
        }
    }
}

fn first_error_code(source: &str) -> ErrorCode {
    let errors = compile(source).expect_err("expected compile failure");
    errors.errors[0].code
}

/// Wrap a `code` body in a unit with one `activated` message handler.
fn unit_with_body(symbols: &str, body: &str) -> String {
    format!("symbols\nmessage activated\n{symbols}\nend\ncode\nactivated:\n{body}\nend")
}

// ─────────────────────────────────────────────────────────────────────
// Symbol table
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_symbol_table_layout() {
    let script = compile_ok(
        "symbols\n\
         message activated\n\
         int counter=3\n\
         flex speed=2\n\
         vector home='1 2 3'\n\
         end\n\
         code\n\
         end",
    );

    // User declarations in order, then the six reserved params.
    assert_eq!(script.symbols.len(), 4 + 6);
    assert_eq!(script.param_base, 4);
    assert_eq!(script.symbols[4].name, "sender");
    assert_eq!(script.symbols[9].name, "param3");

    assert_eq!(script.symbols[1].default, Value::Int(3));
    assert_eq!(script.symbols[1].ty, SymbolType::Int);
    // Int literal promotes to the declared flex kind.
    assert_eq!(script.symbols[2].default, Value::Float(2.0));
    let locals = script.default_locals();
    assert_eq!(locals.len(), 10);
    assert_eq!(locals[1], Value::Int(3));
}

#[test]
fn test_local_extension_sets_flag() {
    let script = compile_ok(
        "symbols\n\
         int counter=0 local\n\
         int linked=0\n\
         end\n\
         code\n\
         end",
    );
    assert!(script.symbols[0].local);
    assert!(!script.symbols[1].local);
}

#[test]
fn test_unknown_extension_is_warning_only() {
    let output = compile(
        "symbols\n\
         int door=0 sparkle\n\
         end\n\
         code\n\
         end",
    )
    .expect("unknown extensions must not fail the compile");
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].code, ErrorCode::UNKNOWN_EXTENSION);
}

#[test]
fn test_message_ids_follow_declaration_order() {
    let script = compile_ok(
        "symbols\n\
         message startup\n\
         int x=0\n\
         message activated\n\
         end\n\
         code\n\
         activated:\n\
         return;\n\
         end",
    );
    assert_eq!(script.messages, vec!["startup", "activated"]);
    assert_eq!(script.message_id("ACTIVATED"), Some(MessageId(1)));
    // Declared but unhandled messages have no entry point.
    assert_eq!(script.entry_point(MessageId(0)), None);
    assert_eq!(script.entry_point(MessageId(1)), Some(0));
}

#[test]
fn test_duplicate_symbol() {
    assert_eq!(
        first_error_code("symbols\nint x=0\nfloat X=0\nend\ncode\nend"),
        ErrorCode::DUPLICATE_SYMBOL
    );
}

#[test]
fn test_reserved_name() {
    assert_eq!(
        first_error_code("symbols\nint sender=0\nend\ncode\nend"),
        ErrorCode::RESERVED_NAME
    );
}

#[test]
fn test_bad_default() {
    assert_eq!(
        first_error_code("symbols\nint x='1 2 3'\nend\ncode\nend"),
        ErrorCode::BAD_DEFAULT
    );
}

// ─────────────────────────────────────────────────────────────────────
// Codegen: straight-line code
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_assignment_bytecode() {
    let script = compile_ok(&unit_with_body("int target=0", "target = 5;"));
    // activated slot 0, target slot 1.
    assert_eq!(
        script.code,
        vec![Instr::PushInt(5), Instr::StoreSlot(1), Instr::Return]
    );
}

#[test]
fn test_constant_substitution() {
    let script = compile_ok(&unit_with_body("int flags=0", "flags = DAMAGE_FIRE;"));
    assert_eq!(script.code[0], Instr::PushInt(4));
}

#[test]
fn test_verb_statement_discards_result() {
    let script = compile_ok(&unit_with_body("", "GetSectorLight(3);"));
    assert_eq!(
        script.code,
        vec![
            Instr::PushInt(3),
            Instr::CallVerb(cog_script::VerbId(1)),
            Instr::Discard,
            Instr::Return
        ]
    );
}

#[test]
fn test_void_verb_statement_has_no_discard() {
    let script = compile_ok(&unit_with_body("", "SetPulse(2.0);"));
    assert!(!script.code.contains(&Instr::Discard));
}

#[test]
fn test_verb_lookup_is_case_insensitive() {
    compile_ok(&unit_with_body("", "setpulse(1.0);"));
}

#[test]
fn test_sleep_and_waitfor() {
    let script = compile_ok(
        "symbols\n\
         message startup\n\
         message activated\n\
         end\n\
         code\n\
         startup:\n\
         sleep(2.0);\n\
         waitfor(activated);\n\
         end",
    );
    assert_eq!(
        script.code,
        vec![
            Instr::PushFloat(2.0),
            Instr::Sleep,
            Instr::Waitfor(MessageId(1)),
            Instr::Return
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Codegen: control flow
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_else_jump_targets() {
    let script = compile_ok(&unit_with_body(
        "int x=0\nint y=0",
        "if (x) y = 1; else y = 2;",
    ));
    assert_eq!(
        script.code,
        vec![
            Instr::LoadSlot(1),
            Instr::JumpIfFalse(5),
            Instr::PushInt(1),
            Instr::StoreSlot(2),
            Instr::Jump(7),
            Instr::PushInt(2),
            Instr::StoreSlot(2),
            Instr::Return
        ]
    );
}

#[test]
fn test_while_loops_back_to_condition() {
    let script = compile_ok(&unit_with_body("int i=0", "while (i < 3) i = i + 1;"));
    assert_eq!(
        script.code,
        vec![
            Instr::LoadSlot(1),
            Instr::PushInt(3),
            Instr::Binary(BinaryOp::Less),
            Instr::JumpIfFalse(9),
            Instr::LoadSlot(1),
            Instr::PushInt(1),
            Instr::Binary(BinaryOp::Add),
            Instr::StoreSlot(1),
            Instr::Jump(0),
            Instr::Return
        ]
    );
}

#[test]
fn test_handler_entry_points() {
    let script = compile_ok(
        "symbols\n\
         message startup\n\
         message activated\n\
         int x=0\n\
         end\n\
         code\n\
         startup:\n\
         x = 1;\n\
         activated:\n\
         x = 2;\n\
         end",
    );
    assert_eq!(script.entry_point(MessageId(0)), Some(0));
    // startup: Push, Store, Return — activated entry follows.
    assert_eq!(script.entry_point(MessageId(1)), Some(3));
}

// ─────────────────────────────────────────────────────────────────────
// Binding errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_undefined_symbol() {
    assert_eq!(
        first_error_code(&unit_with_body("int x=0", "x = ghost;")),
        ErrorCode::UNDEFINED_SYMBOL
    );
}

#[test]
fn test_undefined_verb() {
    assert_eq!(
        first_error_code(&unit_with_body("", "Teleport(1);")),
        ErrorCode::UNDEFINED_VERB
    );
}

#[test]
fn test_verb_arity_mismatch() {
    assert_eq!(
        first_error_code(&unit_with_body("", "SetPulse(1.0, 2.0);")),
        ErrorCode::VERB_ARITY_MISMATCH
    );
}

#[test]
fn test_void_verb_in_expression() {
    assert_eq!(
        first_error_code(&unit_with_body("int x=0", "x = SetPulse(1.0);")),
        ErrorCode::VOID_VERB_IN_EXPRESSION
    );
}

#[test]
fn test_duplicate_label() {
    let source = "symbols\n\
         message activated\n\
         end\n\
         code\n\
         activated:\n\
         return;\n\
         activated:\n\
         return;\n\
         end";
    assert_eq!(first_error_code(source), ErrorCode::DUPLICATE_LABEL);
}

#[test]
fn test_handler_label_must_be_declared() {
    let source = "symbols\nend\ncode\npulse:\nreturn;\nend";
    assert_eq!(first_error_code(source), ErrorCode::UNDEFINED_LABEL);
}

#[test]
fn test_waitfor_target_must_be_message() {
    assert_eq!(
        first_error_code(&unit_with_body("int x=0", "waitfor(x);")),
        ErrorCode::NOT_A_MESSAGE
    );
}

#[test]
fn test_errors_are_atomic() {
    // A clean handler alongside a faulty one still fails the compile.
    let source = "symbols\n\
         message startup\n\
         message activated\n\
         int x=0\n\
         end\n\
         code\n\
         startup:\n\
         x = 1;\n\
         activated:\n\
         x = ghost;\n\
         end";
    assert!(compile(source).is_err());
}

#[test]
fn test_multiple_errors_reported_in_one_pass() {
    let source = &unit_with_body("int x=0", "x = ghost;\nTeleport(1);\nSetPulse(1.0, 2.0);");
    let errors = compile(source).expect_err("expected compile failure");
    assert_eq!(errors.total_errors, 3);
}
