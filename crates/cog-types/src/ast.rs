//! AST node types for the Cog language.
//!
//! Every node carries a [`Span`] for diagnostics. The tree is owned
//! plainly (boxed children for recursive expressions) and lives only for
//! the duration of one compile unit; code generation discards it.

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete Cog unit: a `symbols` section and a `code` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub symbols: Vec<SymbolDecl>,
    pub handlers: Vec<Handler>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Symbols Section
// ══════════════════════════════════════════════════════════════════════════════

/// Declared type of a symbol. `Flex` stores a float but accepts either
/// numeric kind on assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Int,
    Float,
    Vector,
    Message,
    Flex,
}

impl SymbolType {
    /// Recognise a type keyword in a declaration line.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "int" => Self::Int,
            "float" => Self::Float,
            "vector" => Self::Vector,
            "message" => Self::Message,
            "flex" => Self::Flex,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Vector => "vector",
            Self::Message => "message",
            Self::Flex => "flex",
        }
    }
}

/// One line of the `symbols` section:
/// `type name [= default] [extension...]`
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDecl {
    pub ty: SymbolType,
    pub name: Ident,
    pub default: Option<Literal>,
    pub extensions: Vec<Extension>,
    pub span: Span,
}

/// A declaration extension: bare flag (`local`, `nolink`) or `key=value`.
/// Unrecognised extensions are compile Warnings, not Errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub name: Ident,
    pub value: Option<Literal>,
    pub span: Span,
}

/// A literal value with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind {
    Int(i32),
    Float(f32),
    Vector(f32, f32, f32),
}

// ══════════════════════════════════════════════════════════════════════════════
// Code Section
// ══════════════════════════════════════════════════════════════════════════════

/// A message handler: `label:` followed by statements, running until the
/// next label or the end of the `code` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Handler {
    pub label: Ident,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `name = expr;`
    Assign { target: Ident, value: Expr },
    /// Verb call in statement position: `SetPulse(speed);`
    Call { name: Ident, args: Vec<Expr> },
    /// `if (cond) block [else block]`
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `while (cond) block`
    While { cond: Expr, body: Vec<Stmt> },
    /// `return;` — ends the current activation.
    Return,
    /// `sleep(expr);` — cooperative timed suspension.
    Sleep(Expr),
    /// `waitfor(label);` — suspend until the named message arrives.
    Waitfor(Ident),
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i32),
    Float(f32),
    Vector(f32, f32, f32),
    /// Reference to a declared symbol or registered constant.
    Symbol(Ident),
    /// Verb call in expression position: `GetHealth(sender)`.
    Call { name: Ident, args: Vec<Expr> },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x` — logical negation, yields int 0/1.
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    LogAnd,
    LogOr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_type_keywords_round_trip() {
        for ty in [
            SymbolType::Int,
            SymbolType::Float,
            SymbolType::Vector,
            SymbolType::Message,
            SymbolType::Flex,
        ] {
            assert_eq!(SymbolType::from_keyword(ty.keyword()), Some(ty));
        }
        assert_eq!(SymbolType::from_keyword("thing"), None);
        assert_eq!(SymbolType::from_keyword("Int"), None);
    }
}
