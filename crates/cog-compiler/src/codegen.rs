//! Code generation: walks the `code` section and emits the linear
//! instruction stream.
//!
//! Jumps are patched in a second pass over placeholders, so the emitted
//! script never contains an unresolved target. Use-site binding errors
//! (undefined symbols, unknown verbs, arity mismatches) are reported
//! here; on any error the whole compile fails and the partial stream is
//! discarded, so error paths may emit placeholder instructions freely.

use cog_types::ast::{Expr, ExprKind, Handler, Ident, Stmt, StmtKind, SymbolType, Unit};
use cog_types::{CogError, CompileErrors, ErrorCode, SourceFile, Span};

use cog_script::{ConstantTable, Instr, Script, Value, Vector, VerbTable};

use crate::resolver::Resolution;

/// Generate bytecode for every handler in the unit.
pub fn generate(
    unit: &Unit,
    resolution: &Resolution,
    verbs: &VerbTable,
    constants: &ConstantTable,
    source_file: &SourceFile,
) -> (Script, CompileErrors) {
    let mut gen = CodeGen {
        resolution,
        verbs,
        constants,
        source_file,
        code: Vec::new(),
        entries: vec![None; resolution.messages.len()],
        errors: CompileErrors::empty(),
    };

    for handler in &unit.handlers {
        gen.handler(handler);
    }

    let script = Script {
        code: gen.code,
        symbols: resolution.symbols.clone(),
        messages: resolution.messages.clone(),
        entries: gen.entries,
        param_base: resolution.param_base,
    };
    (script, gen.errors)
}

struct CodeGen<'a> {
    resolution: &'a Resolution,
    verbs: &'a VerbTable,
    constants: &'a ConstantTable,
    source_file: &'a SourceFile,
    code: Vec<Instr>,
    entries: Vec<Option<u32>>,
    errors: CompileErrors,
}

impl CodeGen<'_> {
    fn handler(&mut self, handler: &Handler) {
        if let Some(id) = self.message_label(&handler.label) {
            let slot = id.0 as usize;
            if self.entries[slot].is_some() {
                self.error(
                    ErrorCode::DUPLICATE_LABEL,
                    format!("message '{}' already has a handler", handler.label.name),
                    handler.label.span,
                );
            } else {
                self.entries[slot] = Some(self.code.len() as u32);
            }
        }
        for stmt in &handler.body {
            self.stmt(stmt);
        }
        // Falling off the end of a handler returns to the scheduler.
        self.emit(Instr::Return);
    }

    /// Bind a handler label or `waitfor` target to its message id.
    fn message_label(&mut self, label: &Ident) -> Option<cog_script::MessageId> {
        match self.resolution.slot(&label.name) {
            None => {
                self.error(
                    ErrorCode::UNDEFINED_LABEL,
                    format!("'{}' is not a declared symbol", label.name),
                    label.span,
                );
                None
            }
            Some(slot) if self.resolution.slot_type(slot) != SymbolType::Message => {
                self.error(
                    ErrorCode::NOT_A_MESSAGE,
                    format!("'{}' is not declared as a message", label.name),
                    label.span,
                );
                None
            }
            Some(_) => self.resolution.message_id(&label.name),
        }
    }

    // ── Statements ────────────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                self.expr(value);
                match self.resolution.slot(&target.name) {
                    Some(slot) => self.emit(Instr::StoreSlot(slot)),
                    None => self.error(
                        ErrorCode::UNDEFINED_SYMBOL,
                        format!("'{}' is not an assignable symbol", target.name),
                        target.span,
                    ),
                }
            }
            StmtKind::Call { name, args } => self.call(name, args, false),
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                self.expr(cond);
                let skip_then = self.emit_placeholder_jump(true);
                for s in then_body {
                    self.stmt(s);
                }
                match else_body {
                    Some(else_body) => {
                        let skip_else = self.emit_placeholder_jump(false);
                        self.patch(skip_then);
                        for s in else_body {
                            self.stmt(s);
                        }
                        self.patch(skip_else);
                    }
                    None => self.patch(skip_then),
                }
            }
            StmtKind::While { cond, body } => {
                let top = self.code.len() as u32;
                self.expr(cond);
                let exit = self.emit_placeholder_jump(true);
                for s in body {
                    self.stmt(s);
                }
                self.emit(Instr::Jump(top));
                self.patch(exit);
            }
            StmtKind::Return => self.emit(Instr::Return),
            StmtKind::Sleep(duration) => {
                self.expr(duration);
                self.emit(Instr::Sleep);
            }
            StmtKind::Waitfor(label) => {
                if let Some(id) = self.message_label(label) {
                    self.emit(Instr::Waitfor(id));
                }
            }
        }
    }

    // ── Expressions ───────────────────────────────────────────────────────────

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Int(v) => self.emit(Instr::PushInt(*v)),
            ExprKind::Float(v) => self.emit(Instr::PushFloat(*v)),
            ExprKind::Vector(x, y, z) => self.emit(Instr::PushVector(Vector::new(*x, *y, *z))),
            ExprKind::Symbol(ident) => self.symbol(ident),
            ExprKind::Call { name, args } => self.call(name, args, true),
            ExprKind::Unary { op, operand } => {
                self.expr(operand);
                self.emit(Instr::Unary(*op));
            }
            ExprKind::Binary { left, op, right } => {
                self.expr(left);
                self.expr(right);
                self.emit(Instr::Binary(*op));
            }
        }
    }

    /// An identifier in expression position: a declared symbol's slot,
    /// or a registered constant substituted as a literal.
    fn symbol(&mut self, ident: &Ident) {
        if let Some(slot) = self.resolution.slot(&ident.name) {
            self.emit(Instr::LoadSlot(slot));
        } else if let Some(value) = self.constants.lookup(&ident.name) {
            self.emit(match value {
                Value::Int(v) => Instr::PushInt(v),
                Value::Float(v) => Instr::PushFloat(v),
                Value::Vector(v) => Instr::PushVector(v),
            });
        } else {
            self.error(
                ErrorCode::UNDEFINED_SYMBOL,
                format!("'{}' is not a declared symbol or constant", ident.name),
                ident.span,
            );
            self.emit(Instr::PushInt(0));
        }
    }

    /// A verb call. `in_expression` selects between requiring a result
    /// and discarding one.
    fn call(&mut self, name: &Ident, args: &[Expr], in_expression: bool) {
        // Generate arguments regardless so nested errors still surface.
        for arg in args {
            self.expr(arg);
        }

        let Some(id) = self.verbs.lookup(&name.name) else {
            self.error(
                ErrorCode::UNDEFINED_VERB,
                format!("'{}' is not a registered verb", name.name),
                name.span,
            );
            if in_expression {
                self.emit(Instr::PushInt(0));
            }
            return;
        };

        let arity = self.verbs.arity(id);
        if args.len() != arity {
            self.error(
                ErrorCode::VERB_ARITY_MISMATCH,
                format!(
                    "'{}' takes {} argument(s), {} given",
                    name.name,
                    arity,
                    args.len()
                ),
                name.span,
            );
            if in_expression {
                self.emit(Instr::PushInt(0));
            }
            return;
        }

        if in_expression && !self.verbs.has_result(id) {
            self.error(
                ErrorCode::VOID_VERB_IN_EXPRESSION,
                format!("'{}' produces no value", name.name),
                name.span,
            );
            self.emit(Instr::PushInt(0));
            return;
        }

        self.emit(Instr::CallVerb(id));
        if !in_expression && self.verbs.has_result(id) {
            self.emit(Instr::Discard);
        }
    }

    // ── Emission ──────────────────────────────────────────────────────────────

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    /// Emit a jump with a placeholder target; returns its index for
    /// [`Self::patch`].
    fn emit_placeholder_jump(&mut self, conditional: bool) -> usize {
        let at = self.code.len();
        self.emit(if conditional {
            Instr::JumpIfFalse(u32::MAX)
        } else {
            Instr::Jump(u32::MAX)
        });
        at
    }

    /// Point the placeholder jump at `at` to the next instruction.
    fn patch(&mut self, at: usize) {
        let target = self.code.len() as u32;
        match &mut self.code[at] {
            Instr::Jump(t) | Instr::JumpIfFalse(t) => *t = target,
            _ => {}
        }
    }

    fn error(&mut self, code: ErrorCode, message: String, span: Span) {
        self.errors.push_error(CogError::new(
            self.source_file.name.clone(),
            code,
            message,
            span,
            self.source_file.line(span.start_line).unwrap_or(""),
        ));
    }
}
