//! Cog compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Cog Source → Lexer → Parser → Symbol Resolver → Codegen → Script
//! ```
//!
//! Compilation is atomic: every stage runs and reports as many
//! diagnostics as it can, and a [`Script`] is produced only when no
//! stage raised an Error-severity diagnostic. Warnings never block.

pub mod codegen;
pub mod resolver;

use cog_lexer::Lexer;
use cog_parser::Parser;
use cog_script::{ConstantTable, Script, VerbTable};
use cog_types::{CogError, CompileErrors, SourceFile};

/// A successful compile: the executable script plus any warnings.
#[derive(Debug)]
pub struct CompileOutput {
    pub script: Script,
    pub warnings: Vec<CogError>,
}

/// The Cog compiler. Borrows the host's verb and constant tables;
/// every call site and constant reference is resolved against them at
/// compile time, so the VM dispatches by id only.
pub struct Compiler<'a> {
    verbs: &'a VerbTable,
    constants: &'a ConstantTable,
}

impl<'a> Compiler<'a> {
    pub fn new(verbs: &'a VerbTable, constants: &'a ConstantTable) -> Self {
        Self { verbs, constants }
    }

    /// Compile one source file into an immutable [`Script`].
    pub fn compile(&self, source_file: &SourceFile) -> Result<CompileOutput, CompileErrors> {
        let mut diagnostics = CompileErrors::empty();

        let lexed = Lexer::new(source_file).lex();
        diagnostics.extend(lexed.errors);

        let parsed = Parser::new(lexed.tokens, source_file).parse();
        diagnostics.extend(parsed.errors);
        let Some(unit) = parsed.unit else {
            return Err(diagnostics);
        };

        let (resolution, errors) = resolver::resolve(&unit, source_file);
        diagnostics.extend(errors);

        let (script, errors) =
            codegen::generate(&unit, &resolution, self.verbs, self.constants, source_file);
        diagnostics.extend(errors);

        if diagnostics.has_errors() {
            return Err(diagnostics);
        }
        Ok(CompileOutput {
            script,
            warnings: diagnostics.warnings,
        })
    }
}
