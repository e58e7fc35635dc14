//! Cog virtual machine: cooperative execution of compiled scripts.
//!
//! The host creates a [`Runtime`] around its verb table, instantiates
//! compiled scripts into it, delivers messages with
//! [`Runtime::send_message`], and calls [`Runtime::tick`] once per
//! simulation step to wake sleeping instances. Suspension is
//! cooperative: only the `sleep` and `waitfor` instructions yield, and
//! resumption restores the saved program counter and operand stack
//! exactly.

mod error;
mod exec;
mod instance;
mod runtime;
mod scheduler;

pub use error::Fault;
pub use exec::{Outcome, ACTIVATION_BUDGET};
pub use instance::{Continuation, ExecState, InstanceHandle};
pub use runtime::Runtime;
