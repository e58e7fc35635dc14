//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 9. `||`
//! 8. `&&`
//! 7. `==`, `!=`
//! 6. `<`, `>`, `<=`, `>=`
//! 5. `|`
//! 4. `&`
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `!`

use cog_lexer::token::TokenKind;
use cog_types::ast::*;

use crate::parser::Parser;
use cog_types::ErrorCode;

impl<'src> Parser<'src> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_log_or()
    }

    fn parse_log_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_log_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_log_and()?;
            left = binary(left, BinaryOp::LogOr, right);
        }
        Some(left)
    }

    fn parse_log_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            left = binary(left, BinaryOp::LogAnd, right);
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::BangEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut left = self.parse_bit_or()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEq => BinaryOp::LessEq,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEq => BinaryOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_bit_or()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_bit_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_bit_and()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_bit_and()?;
            left = binary(left, BinaryOp::BitOr, right);
        }
        Some(left)
    }

    fn parse_bit_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        while self.eat(&TokenKind::Amp) {
            let right = self.parse_additive()?;
            left = binary(left, BinaryOp::BitAnd, right);
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            Some(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ))
        } else {
            self.parse_primary()
        }
    }

    /// Literal, symbol reference, verb call, or parenthesized expression.
    fn parse_primary(&mut self) -> Option<Expr> {
        match self.peek_kind().clone() {
            TokenKind::IntLit(v) => {
                let span = self.advance().span;
                Some(Expr::new(ExprKind::Int(v), span))
            }
            TokenKind::FloatLit(v) => {
                let span = self.advance().span;
                Some(Expr::new(ExprKind::Float(v), span))
            }
            TokenKind::VectorLit(x, y, z) => {
                let span = self.advance().span;
                Some(Expr::new(ExprKind::Vector(x, y, z), span))
            }
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                let ident = Ident::new(name, span);
                if self.eat(&TokenKind::LParen) {
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    let span = span.merge(self.previous_span());
                    Some(Expr::new(ExprKind::Call { name: ident, args }, span))
                } else {
                    Some(Expr::new(ExprKind::Symbol(ident.clone()), ident.span))
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                Some(inner)
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Comma-separated argument list, empty allowed. The caller eats
    /// the surrounding parentheses.
    pub(crate) fn parse_arg_list(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Some(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(args)
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}
