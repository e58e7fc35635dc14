//! Core parser infrastructure: token cursor, error reporting, recovery.

use cog_lexer::token::{Token, TokenKind};
use cog_types::{CogError, CompileErrors, ErrorCode, SourceFile, Span};

/// The Cog parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and attempts recovery where possible: to the next
/// line inside the `symbols` section, to the next `;` inside `code`.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of parsing.
pub struct ParseResult {
    pub unit: Option<cog_types::ast::Unit>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Line Handling ─────────────────────────────────────────────────────────

    /// Skip all consecutive end-of-line tokens.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::EndOfLine) {
            self.advance();
        }
    }

    /// Newlines are insignificant inside the `code` section; drop them
    /// from the remaining token stream when it begins.
    pub(crate) fn discard_newlines_from_here(&mut self) {
        let tail = self.tokens.split_off(self.pos);
        self.tokens
            .extend(tail.into_iter().filter(|t| t.kind != TokenKind::EndOfLine));
    }

    /// Expect end-of-line or end-of-file, then swallow blank lines.
    pub(crate) fn expect_end_of_line(&mut self) {
        if self.at_end() {
            return;
        }
        if self.check(&TokenKind::EndOfLine) {
            self.advance();
            self.skip_newlines();
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected end of line, got '{}'", self.peek_kind()),
            );
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns the token if matched, or
    /// emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// Expect an identifier token. Returns the name and span.
    pub(crate) fn expect_identifier(&mut self) -> Option<cog_types::ast::Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(cog_types::ast::Ident::new(name, span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let error = CogError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= cog_types::MAX_ERRORS
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip to the start of the next declaration line (symbols section).
    pub(crate) fn sync_to_line(&mut self) {
        while !self.at_end() {
            if self.check(&TokenKind::End) {
                return;
            }
            if self.eat(&TokenKind::EndOfLine) {
                self.skip_newlines();
                return;
            }
            self.advance();
        }
    }

    /// Skip to a statement boundary (code section): past the next `;`,
    /// or stop before `}`, `end`, or a new handler label.
    pub(crate) fn sync_to_statement(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::End => return,
                TokenKind::Identifier(_) if self.look_ahead(1) == &TokenKind::Colon => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a [`cog_types::ast::Unit`].
    pub fn parse(mut self) -> ParseResult {
        let unit = self.parse_unit();
        ParseResult {
            unit,
            errors: self.errors,
        }
    }
}
