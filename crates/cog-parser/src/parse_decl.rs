//! Unit structure and `symbols` section parsing.
//!
//! A unit is `symbols ... end` followed by `code ... end`. Symbol
//! declarations are line-oriented: `type name [= default] [extension...]`

use cog_lexer::token::TokenKind;
use cog_types::ast::*;
use cog_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a whole unit: `symbols` section then `code` section.
    pub(crate) fn parse_unit(&mut self) -> Option<Unit> {
        let start = self.current_span();
        self.skip_newlines();

        if self.expect(&TokenKind::Symbols).is_none() {
            self.error_at_current(
                ErrorCode::MISSING_SECTION,
                "a Cog unit must begin with a 'symbols' section",
            );
            return None;
        }
        self.expect_end_of_line();
        let symbols = self.parse_symbols_section();

        self.skip_newlines();
        if self.expect(&TokenKind::Code).is_none() {
            self.error_at_current(
                ErrorCode::MISSING_SECTION,
                "expected a 'code' section after 'symbols'",
            );
            return None;
        }
        self.discard_newlines_from_here();
        let handlers = self.parse_code_section();

        let span = start.merge(self.previous_span());
        Some(Unit {
            symbols,
            handlers,
            span,
        })
    }

    /// Parse declaration lines until the closing `end`.
    fn parse_symbols_section(&mut self) -> Vec<SymbolDecl> {
        let mut decls = Vec::new();
        loop {
            self.skip_newlines();
            if self.too_many_errors() || self.at_end() {
                break;
            }
            if self.eat(&TokenKind::End) {
                self.expect_end_of_line();
                break;
            }
            if let Some(decl) = self.parse_symbol_decl() {
                decls.push(decl);
            } else {
                self.sync_to_line();
            }
        }
        decls
    }

    /// One declaration line: `type name [= default] [extension...]`
    fn parse_symbol_decl(&mut self) -> Option<SymbolDecl> {
        let start = self.current_span();
        let type_ident = self.expect_identifier()?;
        let ty = match SymbolType::from_keyword(&type_ident.name) {
            Some(ty) => ty,
            None => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("unknown symbol type '{}'", type_ident.name),
                    type_ident.span,
                );
                return None;
            }
        };
        let name = self.expect_identifier()?;

        let default = if self.eat(&TokenKind::Eq) {
            let lit = self.parse_literal()?;
            if ty == SymbolType::Message {
                self.error_at(
                    ErrorCode::BAD_DEFAULT,
                    "message symbols cannot take a default value",
                    lit.span,
                );
            }
            Some(lit)
        } else {
            None
        };

        let extensions = self.parse_extensions();
        let span = start.merge(self.previous_span());
        self.expect_end_of_line();

        Some(SymbolDecl {
            ty,
            name,
            default,
            extensions,
            span,
        })
    }

    /// Trailing extensions on a declaration line: `local`, `nolink`,
    /// `key=value`. Everything up to end-of-line.
    fn parse_extensions(&mut self) -> Vec<Extension> {
        let mut extensions = Vec::new();
        while let TokenKind::Identifier(name) = self.peek_kind().clone() {
            let start = self.current_span();
            let ident = Ident::new(name, self.advance().span);
            let value = if self.eat(&TokenKind::Eq) {
                self.parse_literal()
            } else {
                None
            };
            let span = start.merge(self.previous_span());
            extensions.push(Extension {
                name: ident,
                value,
                span,
            });
        }
        extensions
    }

    /// A literal: int, hex, float, or vector, with optional leading `-`.
    pub(crate) fn parse_literal(&mut self) -> Option<Literal> {
        let start = self.current_span();
        let negate = self.eat(&TokenKind::Minus);
        match self.peek_kind().clone() {
            TokenKind::IntLit(v) => {
                let span = start.merge(self.advance().span);
                let v = if negate { -v } else { v };
                Some(Literal {
                    kind: LiteralKind::Int(v),
                    span,
                })
            }
            TokenKind::FloatLit(v) => {
                let span = start.merge(self.advance().span);
                let v = if negate { -v } else { v };
                Some(Literal {
                    kind: LiteralKind::Float(v),
                    span,
                })
            }
            TokenKind::VectorLit(x, y, z) if !negate => {
                let span = self.advance().span;
                Some(Literal {
                    kind: LiteralKind::Vector(x, y, z),
                    span,
                })
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected literal value, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }
}
