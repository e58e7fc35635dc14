//! Runtime faults.
//!
//! A fault halts the instance that raised it and nothing else: the
//! scheduler, other instances, and the host tick loop all continue.

use cog_script::{ValueError, VerbError};
use thiserror::Error;

/// A runtime fault recorded on the halting instance.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    #[error("operand stack underflow")]
    StackUnderflow,
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("invalid storage slot {0}")]
    InvalidSlot(u16),
    #[error("sleep expects a numeric duration")]
    NonNumericSleep,
    #[error("verb '{verb}' failed: {source}")]
    Verb {
        verb: String,
        #[source]
        source: VerbError,
    },
    #[error("instruction budget exhausted")]
    BudgetExhausted,
}
