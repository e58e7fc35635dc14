//! `code` section parsing: message handlers and statements.
//!
//! Newlines are insignificant here; statements end with `;` and a
//! handler runs from its `label:` to the next label or the closing
//! `end`.

use cog_lexer::token::TokenKind;
use cog_types::ast::*;
use cog_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse handlers until the closing `end`.
    pub(crate) fn parse_code_section(&mut self) -> Vec<Handler> {
        let mut handlers = Vec::new();
        loop {
            self.skip_newlines();
            if self.too_many_errors() || self.at_end() {
                break;
            }
            if self.eat(&TokenKind::End) {
                break;
            }
            if let Some(handler) = self.parse_handler() {
                handlers.push(handler);
            } else {
                self.sync_to_statement();
            }
        }
        handlers
    }

    /// `label:` followed by statements up to the next label or `end`.
    fn parse_handler(&mut self) -> Option<Handler> {
        let start = self.current_span();
        let label = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if self.too_many_errors() || self.at_end() || self.check(&TokenKind::End) {
                break;
            }
            if self.at_handler_label() {
                break;
            }
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            } else {
                self.sync_to_statement();
            }
        }

        let span = start.merge(self.previous_span());
        Some(Handler { label, body, span })
    }

    /// True when the cursor sits on `ident :` — the start of a handler.
    fn at_handler_label(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Identifier(_))
            && self.look_ahead(1) == &TokenKind::Colon
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.skip_newlines();
        match self.peek_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Sleep => self.parse_sleep(),
            TokenKind::Waitfor => self.parse_waitfor(),
            TokenKind::Identifier(_) => {
                if self.look_ahead(1) == &TokenKind::Eq {
                    self.parse_assignment()
                } else {
                    self.parse_call_statement()
                }
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected statement, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// `name = expr;`
    fn parse_assignment(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let target = self.expect_identifier()?;
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Assign { target, value }, span))
    }

    /// `Verb(args);`
    fn parse_call_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let args = self.parse_arg_list()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Call { name, args }, span))
    }

    /// `if (cond) body [else body]`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let then_body = self.parse_body()?;
        self.skip_newlines();
        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::If {
                cond,
                then_body,
                else_body,
            },
            span,
        ))
    }

    /// `while (cond) body`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_body()?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::While { cond, body }, span))
    }

    /// A statement body: `{ stmts... }` or a single statement.
    fn parse_body(&mut self) -> Option<Vec<Stmt>> {
        self.skip_newlines();
        if self.eat(&TokenKind::LBrace) {
            let mut stmts = Vec::new();
            loop {
                self.skip_newlines();
                if self.too_many_errors() || self.at_end() {
                    break;
                }
                if self.eat(&TokenKind::RBrace) {
                    return Some(stmts);
                }
                if let Some(stmt) = self.parse_statement() {
                    stmts.push(stmt);
                } else {
                    self.sync_to_statement();
                }
            }
            self.expect(&TokenKind::RBrace)?;
            Some(stmts)
        } else {
            Some(vec![self.parse_statement()?])
        }
    }

    /// `return;`
    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `return`
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Return, span))
    }

    /// `sleep(expr);`
    fn parse_sleep(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `sleep`
        self.expect(&TokenKind::LParen)?;
        let duration = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Sleep(duration), span))
    }

    /// `waitfor(label);`
    fn parse_waitfor(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // eat `waitfor`
        self.expect(&TokenKind::LParen)?;
        let label = self.expect_identifier()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Waitfor(label), span))
    }
}
