//! The immutable compiled artifact.

use crate::instr::Instr;
use crate::value::Value;
use cog_types::ast::SymbolType;

/// Compile-time-resolved id of a message label. Indexes the owning
/// script's message table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub u16);

/// Implicitly declared locals appended after the user's symbols, in
/// this order. `send_message` writes the call-scoped context here
/// before entry or resumption.
pub const RESERVED_PARAMS: &[&str] = &[
    "sender", "source", "param0", "param1", "param2", "param3",
];

/// One entry of a script's symbol table. Slot index is the position in
/// declaration order, stable across the script's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSlot {
    pub name: String,
    pub ty: SymbolType,
    pub default: Value,
    /// `local` symbols are private to the instance and never exposed to
    /// the surrounding level for linking.
    pub local: bool,
}

/// A compiled Cog script: bytecode, symbol table with defaults, and the
/// message-label → entry-point map.
///
/// Never mutated after compilation; shared across all of its instances
/// via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// Linear instruction stream.
    pub code: Vec<Instr>,
    /// Ordered symbol table (user declarations, then reserved params).
    pub symbols: Vec<SymbolSlot>,
    /// Declared message names; index is the `MessageId`.
    pub messages: Vec<String>,
    /// Entry instruction index per `MessageId`; `None` when the message
    /// is declared but has no handler.
    pub entries: Vec<Option<u32>>,
    /// Slot index of the first reserved parameter (`sender`).
    pub param_base: u16,
}

impl Script {
    /// Look up a message label by name (engine-facing delivery uses
    /// strings; everything internal uses the id).
    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.messages
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| MessageId(i as u16))
    }

    /// The source name of a message id.
    pub fn message_name(&self, id: MessageId) -> &str {
        &self.messages[id.0 as usize]
    }

    /// The entry instruction index for a message, if it has a handler.
    pub fn entry_point(&self, id: MessageId) -> Option<u32> {
        self.entries.get(id.0 as usize).copied().flatten()
    }

    /// Fresh local storage for a new instance: one value per symbol,
    /// initialized from the defaults.
    pub fn default_locals(&self) -> Vec<Value> {
        self.symbols.iter().map(|s| s.default).collect()
    }

    /// Find a symbol's storage slot by name, case-insensitively.
    pub fn symbol_slot(&self, name: &str) -> Option<u16> {
        self.symbols
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
            .map(|i| i as u16)
    }
}
