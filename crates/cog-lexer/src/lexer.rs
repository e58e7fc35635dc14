//! Core Cog lexer — converts source text to a token stream.
//!
//! Features:
//! - Identifiers, structural keywords, operators, punctuation
//! - Integer (decimal and `0x` hex), float, and `'x y z'` vector literals
//! - Single-line comments stripped (`//`)
//! - End-of-line emitted as a token (declarations are line-oriented)
//! - Error recovery: collects up to [`cog_types::MAX_ERRORS`] errors
//!   instead of stopping at the first

use cog_types::{CogError, CompileErrors, ErrorCode, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Cog lexer.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Byte offset where the token being scanned started.
    token_start: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of lexing: tokens plus any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            token_start: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= cog_types::MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    /// The text of the token currently being scanned.
    fn lexeme(&self) -> &str {
        std::str::from_utf8(&self.source[self.token_start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let err = CogError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces and tabs (NOT newlines — those are tokens) and
    /// `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        // Error recovery re-enters here once per bad character; stop
        // scanning outright when the error budget is spent so a long
        // run of invalid input cannot recurse unboundedly.
        if self.errors.total_errors >= cog_types::MAX_ERRORS {
            return Token::new(TokenKind::Eof, self.current_span());
        }
        self.skip_trivia();

        if self.at_end() {
            return Token::new(TokenKind::Eof, self.current_span());
        }

        self.token_start = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Token::new(TokenKind::Eof, self.current_span()),
        };

        let tok = |kind: TokenKind, lexer: &Self| -> Token {
            Token::new(kind, lexer.span_from(start_line, start_col))
        };

        match ch {
            b'\n' => tok(TokenKind::EndOfLine, self),

            b'0'..=b'9' => self.scan_number(start_line, start_col),
            b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => {
                self.scan_number(start_line, start_col)
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(start_line, start_col),

            b'\'' => self.scan_vector(start_line, start_col),

            b'+' => tok(TokenKind::Plus, self),
            b'-' => tok(TokenKind::Minus, self),
            b'*' => tok(TokenKind::Star, self),
            b'/' => tok(TokenKind::Slash, self),
            b'%' => tok(TokenKind::Percent, self),
            b'(' => tok(TokenKind::LParen, self),
            b')' => tok(TokenKind::RParen, self),
            b'{' => tok(TokenKind::LBrace, self),
            b'}' => tok(TokenKind::RBrace, self),
            b',' => tok(TokenKind::Comma, self),
            b':' => tok(TokenKind::Colon, self),
            b';' => tok(TokenKind::Semicolon, self),

            b'&' => {
                if self.peek() == Some(b'&') {
                    self.advance();
                    tok(TokenKind::AmpAmp, self)
                } else {
                    tok(TokenKind::Amp, self)
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.advance();
                    tok(TokenKind::PipePipe, self)
                } else {
                    tok(TokenKind::Pipe, self)
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    tok(TokenKind::EqEq, self)
                } else {
                    tok(TokenKind::Eq, self)
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    tok(TokenKind::BangEq, self)
                } else {
                    tok(TokenKind::Bang, self)
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    tok(TokenKind::LessEq, self)
                } else {
                    tok(TokenKind::Less, self)
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    tok(TokenKind::GreaterEq, self)
                } else {
                    tok(TokenKind::Greater, self)
                }
            }

            _ => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{}'", ch as char),
                    span,
                );
                // Error recovery: skip the character and try again.
                self.scan_token()
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    /// Scan a numeric literal. Forms: `42`, `0x240`, `2.75`, `.5`, `1.`
    fn scan_number(&mut self, start_line: u32, start_col: u32) -> Token {
        // Hex: first char was '0' and the next is 'x' / 'X'.
        if self.lexeme() == "0" && matches!(self.peek(), Some(b'x' | b'X')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')) {
                self.advance();
            }
            let span = self.span_from(start_line, start_col);
            let digits = &self.lexeme()[2..];
            let value = i64::from_str_radix(digits, 16).ok().filter(|_| !digits.is_empty());
            return match value {
                Some(v) => Token::new(TokenKind::IntLit(v as i32), span),
                None => {
                    self.emit_error(
                        ErrorCode::MALFORMED_LITERAL,
                        format!("malformed hex literal '{}'", self.lexeme()),
                        span,
                    );
                    Token::new(TokenKind::IntLit(0), span)
                }
            };
        }

        let mut is_float = self.lexeme().starts_with('.');
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if !is_float && self.peek() == Some(b'.') {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }

        let span = self.span_from(start_line, start_col);
        if is_float {
            match self.lexeme().parse::<f32>() {
                Ok(v) => Token::new(TokenKind::FloatLit(v), span),
                Err(_) => {
                    self.emit_error(
                        ErrorCode::MALFORMED_LITERAL,
                        format!("malformed float literal '{}'", self.lexeme()),
                        span,
                    );
                    Token::new(TokenKind::FloatLit(0.0), span)
                }
            }
        } else {
            match self.lexeme().parse::<i32>() {
                Ok(v) => Token::new(TokenKind::IntLit(v), span),
                Err(_) => {
                    self.emit_error(
                        ErrorCode::MALFORMED_LITERAL,
                        format!("integer literal '{}' out of range", self.lexeme()),
                        span,
                    );
                    Token::new(TokenKind::IntLit(0), span)
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) -> Token {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let span = self.span_from(start_line, start_col);
        let text = self.lexeme();
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, span)
    }

    // ─────────────────────────────────────────────────────────────
    // Vector literals
    // ─────────────────────────────────────────────────────────────

    /// Scan `'x y z'` after the opening quote. Exactly three numeric
    /// components separated by whitespace.
    fn scan_vector(&mut self, start_line: u32, start_col: u32) -> Token {
        let mut components: Vec<f32> = Vec::new();
        let mut malformed = false;

        loop {
            // Skip spaces between components.
            while matches!(self.peek(), Some(b' ' | b'\t')) {
                self.advance();
            }
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_VECTOR,
                        "unterminated vector literal",
                        span,
                    );
                    return Token::new(TokenKind::VectorLit(0.0, 0.0, 0.0), span);
                }
                Some(b'\'') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    let comp_start = self.pos;
                    while matches!(
                        self.peek(),
                        Some(b'0'..=b'9' | b'.' | b'-' | b'+')
                    ) {
                        self.advance();
                    }
                    if self.pos == comp_start {
                        // Non-numeric garbage inside the quotes.
                        malformed = true;
                        self.advance();
                        continue;
                    }
                    let text =
                        std::str::from_utf8(&self.source[comp_start..self.pos]).unwrap_or("");
                    match text.parse::<f32>() {
                        Ok(v) => components.push(v),
                        Err(_) => malformed = true,
                    }
                }
            }
        }

        let span = self.span_from(start_line, start_col);
        if malformed || components.len() != 3 {
            self.emit_error(
                ErrorCode::MALFORMED_LITERAL,
                "vector literal requires exactly three numeric components",
                span,
            );
            return Token::new(TokenKind::VectorLit(0.0, 0.0, 0.0), span);
        }
        Token::new(
            TokenKind::VectorLit(components[0], components[1], components[2]),
            span,
        )
    }
}
