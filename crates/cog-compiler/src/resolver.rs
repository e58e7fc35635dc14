//! Symbol resolution: turns the `symbols` section into the script's
//! slot and message tables.
//!
//! Declarations get storage slots in source order; the reserved call
//! parameters (`sender`, `source`, `param0`..`param3`) are appended
//! after them. Duplicate and reserved names are errors, unknown
//! declaration extensions are warnings.

use cog_types::ast::{Extension, Literal, LiteralKind, SymbolDecl, SymbolType, Unit};
use cog_types::{CogError, CompileErrors, ErrorCode, SourceFile, Span};

use cog_script::{MessageId, SymbolSlot, Value, Vector, RESERVED_PARAMS};

/// Declaration extensions the compiler knows about. Anything else in a
/// declaration line is accepted with a warning so scripts written for a
/// richer host still compile.
const KNOWN_EXTENSIONS: &[&str] = &["local", "nolink", "desc", "mask", "linkid"];

/// The resolved symbol environment: everything code generation needs to
/// bind identifiers.
#[derive(Debug)]
pub struct Resolution {
    /// Slot table, user declarations first, then reserved params.
    pub symbols: Vec<SymbolSlot>,
    /// Declared message names in declaration order.
    pub messages: Vec<String>,
    /// Slot index of `sender`, the first reserved param.
    pub param_base: u16,
}

impl Resolution {
    /// Storage slot of a declared symbol, case-insensitive.
    pub fn slot(&self, name: &str) -> Option<u16> {
        self.symbols
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .map(|i| i as u16)
    }

    /// Declared type at a slot.
    pub fn slot_type(&self, slot: u16) -> SymbolType {
        self.symbols[slot as usize].ty
    }

    /// Message id of a declared message symbol, case-insensitive.
    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.messages
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| MessageId(i as u16))
    }
}

/// Resolve the `symbols` section of a unit. Always produces a usable
/// [`Resolution`] so code generation can run and report use-site errors
/// even when declarations were faulty.
pub fn resolve(unit: &Unit, source_file: &SourceFile) -> (Resolution, CompileErrors) {
    let mut resolver = Resolver {
        source_file,
        symbols: Vec::new(),
        messages: Vec::new(),
        errors: CompileErrors::empty(),
    };

    for decl in &unit.symbols {
        resolver.declare(decl);
    }
    resolver.append_reserved_params();

    let param_base = (resolver.symbols.len() - RESERVED_PARAMS.len()) as u16;
    let resolution = Resolution {
        symbols: resolver.symbols,
        messages: resolver.messages,
        param_base,
    };
    (resolution, resolver.errors)
}

struct Resolver<'src> {
    source_file: &'src SourceFile,
    symbols: Vec<SymbolSlot>,
    messages: Vec<String>,
    errors: CompileErrors,
}

impl Resolver<'_> {
    fn declare(&mut self, decl: &SymbolDecl) {
        let name = &decl.name.name;

        if RESERVED_PARAMS
            .iter()
            .any(|r| r.eq_ignore_ascii_case(name))
        {
            self.error(
                ErrorCode::RESERVED_NAME,
                format!("'{name}' is a reserved parameter name"),
                decl.name.span,
            );
            return;
        }
        if self
            .symbols
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            self.error(
                ErrorCode::DUPLICATE_SYMBOL,
                format!("symbol '{name}' is already declared"),
                decl.name.span,
            );
            return;
        }

        let local = self.check_extensions(&decl.extensions);

        let default = match decl.ty {
            SymbolType::Message => {
                let id = self.messages.len() as i32;
                self.messages.push(name.clone());
                Value::Int(id)
            }
            ty => self.default_value(ty, name, decl.default.as_ref()),
        };

        self.symbols.push(SymbolSlot {
            name: name.clone(),
            ty: decl.ty,
            default,
            local,
        });
    }

    /// Validate extensions; returns whether the symbol is `local`.
    fn check_extensions(&mut self, extensions: &[Extension]) -> bool {
        let mut local = false;
        for ext in extensions {
            let name = &ext.name.name;
            if name.eq_ignore_ascii_case("local") {
                local = true;
            } else if !KNOWN_EXTENSIONS
                .iter()
                .any(|k| k.eq_ignore_ascii_case(name))
            {
                self.warning(
                    ErrorCode::UNKNOWN_EXTENSION,
                    format!("unknown declaration extension '{name}'"),
                    ext.span,
                );
            }
        }
        local
    }

    /// Convert a declared default to a [`Value`] of the symbol's type,
    /// or produce the type's zero value when absent or mismatched.
    fn default_value(&mut self, ty: SymbolType, name: &str, default: Option<&Literal>) -> Value {
        let zero = match ty {
            SymbolType::Int => Value::Int(0),
            SymbolType::Float | SymbolType::Flex => Value::Float(0.0),
            SymbolType::Vector => Value::Vector(Vector::ZERO),
            SymbolType::Message => unreachable!("message defaults handled in declare"),
        };
        let Some(lit) = default else { return zero };

        let converted = match (ty, lit.kind) {
            (SymbolType::Int, LiteralKind::Int(v)) => Some(Value::Int(v)),
            (SymbolType::Float | SymbolType::Flex, LiteralKind::Int(v)) => {
                Some(Value::Float(v as f32))
            }
            (SymbolType::Float | SymbolType::Flex, LiteralKind::Float(v)) => {
                Some(Value::Float(v))
            }
            (SymbolType::Vector, LiteralKind::Vector(x, y, z)) => {
                Some(Value::Vector(Vector::new(x, y, z)))
            }
            _ => None,
        };
        match converted {
            Some(v) => v,
            None => {
                self.error(
                    ErrorCode::BAD_DEFAULT,
                    format!("default value for '{name}' does not match its declared type"),
                    lit.span,
                );
                zero
            }
        }
    }

    fn append_reserved_params(&mut self) {
        for &name in RESERVED_PARAMS {
            let default = match name {
                "sender" | "source" => Value::Int(-1),
                _ => Value::Int(0),
            };
            self.symbols.push(SymbolSlot {
                name: name.to_string(),
                ty: SymbolType::Flex,
                default,
                local: true,
            });
        }
    }

    fn error(&mut self, code: ErrorCode, message: String, span: Span) {
        self.errors.push_error(self.diagnostic(code, message, span));
    }

    fn warning(&mut self, code: ErrorCode, message: String, span: Span) {
        self.errors
            .push_warning(self.diagnostic(code, message, span));
    }

    fn diagnostic(&self, code: ErrorCode, message: String, span: Span) -> CogError {
        CogError::new(
            self.source_file.name.clone(),
            code,
            message,
            span,
            self.source_file.line(span.start_line).unwrap_or(""),
        )
    }
}
