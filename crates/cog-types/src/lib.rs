//! Shared types for the Cog compiler.
//!
//! This crate defines the AST node types, source spans, diagnostic types,
//! and other shared data structures used across all compiler stages.

mod error;
mod span;
pub mod ast;

pub use error::{CogError, CompileErrors, ErrorCategory, ErrorCode, Severity, MAX_ERRORS};
pub use span::{SourceFile, Span};
