//! Token types for the Cog lexer.
//!
//! Defines [`TokenKind`] covering every Cog lexeme and [`Token`], which
//! pairs a kind with a source [`Span`]. End-of-line is a real token:
//! the `symbols` section is one declaration per line.

use cog_types::Span;
use std::fmt;

/// The structural keywords of Cog.
///
/// Type names (`int`, `float`, ...) are deliberately *not* reserved —
/// they only matter at the head of a declaration line, where the parser
/// recognises them contextually.
pub const KEYWORDS: &[&str] = &[
    "symbols", "code", "end", "if", "else", "while", "return", "sleep", "waitfor",
];

/// A single token produced by the Cog lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in the Cog language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Integer literal, decimal or hex: `42`, `0x240`
    IntLit(i32),
    /// Float literal: `2.75`, `.5`, `1.`
    FloatLit(f32),
    /// Vector literal: `'1 2.5 -3'`
    VectorLit(f32, f32, f32),

    // ── Identifiers ──────────────────────────────────────────

    /// Symbol, verb, constant, or type name.
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────

    /// `symbols`
    Symbols,
    /// `code`
    Code,
    /// `end`
    End,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `return`
    Return,
    /// `sleep`
    Sleep,
    /// `waitfor`
    Waitfor,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,

    // ── Punctuation ──────────────────────────────────────────

    /// `=`
    Eq,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,

    // ── Special ──────────────────────────────────────────────

    /// End of line (significant in the `symbols` section).
    EndOfLine,
    /// End of file.
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for plain identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "symbols" => TokenKind::Symbols,
            "code" => TokenKind::Code,
            "end" => TokenKind::End,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "sleep" => TokenKind::Sleep,
            "waitfor" => TokenKind::Waitfor,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLit(n) => write!(f, "{n}"),
            TokenKind::FloatLit(n) => write!(f, "{n}"),
            TokenKind::VectorLit(x, y, z) => write!(f, "'{x} {y} {z}'"),
            TokenKind::Identifier(s) => f.write_str(s),
            TokenKind::Symbols => f.write_str("symbols"),
            TokenKind::Code => f.write_str("code"),
            TokenKind::End => f.write_str("end"),
            TokenKind::If => f.write_str("if"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::While => f.write_str("while"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::Sleep => f.write_str("sleep"),
            TokenKind::Waitfor => f.write_str("waitfor"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Percent => f.write_str("%"),
            TokenKind::Amp => f.write_str("&"),
            TokenKind::Pipe => f.write_str("|"),
            TokenKind::AmpAmp => f.write_str("&&"),
            TokenKind::PipePipe => f.write_str("||"),
            TokenKind::Bang => f.write_str("!"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::Eq => f.write_str("="),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::EndOfLine => f.write_str("end of line"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keyword_recognises_all() {
        for &kw in KEYWORDS {
            assert!(
                TokenKind::from_keyword(kw).is_some(),
                "from_keyword should recognise '{kw}'"
            );
        }
    }

    #[test]
    fn test_type_names_are_identifiers() {
        for name in ["int", "float", "vector", "message", "flex", "local"] {
            assert!(
                TokenKind::from_keyword(name).is_none(),
                "'{name}' must lex as a plain identifier"
            );
        }
    }

    #[test]
    fn test_keywords_case_sensitive() {
        assert!(TokenKind::from_keyword("waitfor").is_some());
        assert!(TokenKind::from_keyword("WaitFor").is_none());
        assert!(TokenKind::from_keyword("SLEEP").is_none());
    }

    #[test]
    fn test_display_round_trips_keywords() {
        for &kw in KEYWORDS {
            let kind = TokenKind::from_keyword(kw).unwrap();
            assert_eq!(kind.to_string(), kw);
        }
    }
}
