//! The Cog stack-machine instruction set.

use crate::script::MessageId;
use crate::value::Vector;
use crate::verb_table::VerbId;
use cog_types::ast::{BinaryOp, UnaryOp};

/// One bytecode instruction. Jump targets are instruction indices into
/// the owning script's code, resolved during code generation — the VM
/// never sees an unresolved target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr {
    /// Push an integer literal.
    PushInt(i32),
    /// Push a float literal.
    PushFloat(f32),
    /// Push a vector literal.
    PushVector(Vector),
    /// Push the value of a local storage slot.
    LoadSlot(u16),
    /// Pop into a local storage slot.
    StoreSlot(u16),
    /// Apply a unary operator to the top of the stack.
    Unary(UnaryOp),
    /// Pop two operands, push the result.
    Binary(BinaryOp),
    /// Dispatch a verb by id; pops the verb's declared arity, pushes its
    /// result if it has one.
    CallVerb(VerbId),
    /// Drop the top of the stack (unused verb result in statement
    /// position).
    Discard,
    /// Unconditional jump.
    Jump(u32),
    /// Pop a value; jump if it is falsy.
    JumpIfFalse(u32),
    /// Pop a duration in seconds and suspend until the simulation clock
    /// reaches it.
    Sleep,
    /// Suspend until the named message is delivered to this instance.
    Waitfor(MessageId),
    /// End the current activation.
    Return,
}
