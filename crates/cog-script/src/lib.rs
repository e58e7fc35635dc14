//! Compiled-artifact types shared by the Cog compiler and VM.
//!
//! The compiler produces a [`Script`]; the VM consumes it. Verbs and
//! constants are registered here before compilation, resolved to ids at
//! compile time, and dispatched by id at runtime.

mod constant_table;
mod instr;
mod script;
mod value;
mod verb_table;

pub use constant_table::ConstantTable;
pub use instr::Instr;
pub use script::{MessageId, Script, SymbolSlot, RESERVED_PARAMS};
pub use value::{Value, ValueError, ValueKind, Vector};
pub use verb_table::{VerbError, VerbFn, VerbId, VerbSignature, VerbTable};
