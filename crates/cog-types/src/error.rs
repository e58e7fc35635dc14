use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic severity.
///
/// Warnings never abort compilation; any Error makes `compile()` fail
/// atomically with no Script produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Symbol,
    Verb,
    Message,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const MALFORMED_LITERAL: Self = Self(101);
    pub const UNTERMINATED_VECTOR: Self = Self(102);
    pub const UNEXPECTED_TOKEN: Self = Self(110);
    pub const MISSING_SECTION: Self = Self(111);

    // ── Symbols (E200–E299) ──
    pub const UNDEFINED_SYMBOL: Self = Self(200);
    pub const DUPLICATE_SYMBOL: Self = Self(201);
    pub const RESERVED_NAME: Self = Self(202);
    pub const BAD_DEFAULT: Self = Self(203);
    /// Unknown declaration extension — Warning, compilation continues.
    pub const UNKNOWN_EXTENSION: Self = Self(210);

    // ── Verbs (E300–E399) ──
    pub const UNDEFINED_VERB: Self = Self(300);
    pub const VERB_ARITY_MISMATCH: Self = Self(301);
    pub const VOID_VERB_IN_EXPRESSION: Self = Self(302);

    // ── Messages & labels (E400–E499) ──
    pub const DUPLICATE_LABEL: Self = Self(400);
    pub const UNDEFINED_LABEL: Self = Self(401);
    pub const NOT_A_MESSAGE: Self = Self(402);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Symbol,
            300..=399 => ErrorCategory::Verb,
            400..=499 => ErrorCategory::Message,
            _ => ErrorCategory::Syntax, // fallback
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured Cog compile diagnostic.
///
/// Carries everything a host tool needs to render the problem without
/// re-reading the source: file, code, span, and the offending line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CogError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E300).
    pub code: ErrorCode,
    /// Diagnostic severity.
    pub severity: Severity,
    /// Category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
}

impl CogError {
    /// Create a new Error-severity diagnostic.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }

    /// Downgrade to Warning severity.
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

impl fmt::Display for CogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for CogError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Symbol => write!(f, "symbol"),
            Self::Verb => write!(f, "verb"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// Aggregated diagnostics for one compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<CogError>,
    pub warnings: Vec<CogError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    /// Create an empty result (no diagnostics).
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            total_errors: 0,
            total_warnings: 0,
        }
    }

    /// Check if there are any Error-severity diagnostics.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS storage limit.
    pub fn push_error(&mut self, error: CogError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Add a warning.
    pub fn push_warning(&mut self, warning: CogError) {
        self.warnings.push(warning.as_warning());
        self.total_warnings += 1;
    }

    /// Fold another aggregate into this one (pipeline stages each
    /// produce their own).
    pub fn extend(&mut self, other: CompileErrors) {
        let stored = other.errors.len();
        for e in other.errors {
            self.push_error(e);
        }
        // Errors past the storage cap are counted but not stored.
        self.total_errors += other.total_errors.saturating_sub(stored);
        for w in other.warnings {
            self.push_warning(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_categories() {
        assert_eq!(
            ErrorCode::UNEXPECTED_TOKEN.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(
            ErrorCode::DUPLICATE_SYMBOL.category(),
            ErrorCategory::Symbol
        );
        assert_eq!(ErrorCode::UNDEFINED_VERB.category(), ErrorCategory::Verb);
        assert_eq!(
            ErrorCode::DUPLICATE_LABEL.category(),
            ErrorCategory::Message
        );
    }

    #[test]
    fn test_code_display() {
        assert_eq!(ErrorCode::UNDEFINED_VERB.to_string(), "E300");
        assert_eq!(ErrorCode::UNEXPECTED_CHARACTER.to_string(), "E100");
    }

    #[test]
    fn test_error_construction() {
        let err = CogError::new(
            "door.cog",
            ErrorCode::VERB_ARITY_MISMATCH,
            "verb 'SetPulse' expects 1 argument, got 2",
            Span::new(9, 5, 9, 22),
            "    SetPulse(a, b);",
        );
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.category, ErrorCategory::Verb);
    }

    #[test]
    fn test_error_serializes_with_flattened_span() {
        let err = CogError::new(
            "door.cog",
            ErrorCode::UNDEFINED_VERB,
            "'Teleport' is not a registered verb",
            Span::new(12, 5, 12, 13),
            "    Teleport(player);",
        );
        let json = serde_json::to_value(&err).expect("diagnostic should serialize");
        assert_eq!(json["file"], "door.cog");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["category"], "verb");
        assert_eq!(json["start_line"], 12);
        assert_eq!(json["end_col"], 13);
    }

    #[test]
    fn test_warning_downgrade() {
        let mut errs = CompileErrors::empty();
        errs.push_warning(CogError::new(
            "door.cog",
            ErrorCode::UNKNOWN_EXTENSION,
            "unknown extension 'linkid'",
            Span::point(3, 20),
            "int slot=0 linkid=2",
        ));
        assert!(!errs.has_errors());
        assert_eq!(errs.total_warnings, 1);
        assert_eq!(errs.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_max_errors_cap() {
        let mut errs = CompileErrors::empty();
        for i in 0..30 {
            errs.push_error(CogError::new(
                "door.cog",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("error {i}"),
                Span::point(i + 1, 1),
                "",
            ));
        }
        // Only MAX_ERRORS stored, but the total keeps counting.
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, 30);
    }

    #[test]
    fn test_json_shape() {
        let err = CogError::new(
            "door.cog",
            ErrorCode::UNDEFINED_SYMBOL,
            "undefined symbol 'counter'",
            Span::new(8, 5, 8, 11),
            "    counter = 1;",
        );
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"start_line\""));
        assert!(json.contains("\"source_line\""));

        let back: CogError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn test_extend_merges_both_kinds() {
        let mut a = CompileErrors::empty();
        a.push_error(CogError::new(
            "door.cog",
            ErrorCode::UNEXPECTED_TOKEN,
            "bad token",
            Span::point(1, 1),
            "",
        ));
        let mut b = CompileErrors::empty();
        b.push_error(CogError::new(
            "door.cog",
            ErrorCode::UNDEFINED_VERB,
            "undefined verb",
            Span::point(2, 1),
            "",
        ));
        b.push_warning(CogError::new(
            "door.cog",
            ErrorCode::UNKNOWN_EXTENSION,
            "unknown extension",
            Span::point(3, 1),
            "",
        ));
        a.extend(b);
        assert_eq!(a.total_errors, 2);
        assert_eq!(a.total_warnings, 1);
    }
}
