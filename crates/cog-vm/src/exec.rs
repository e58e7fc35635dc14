//! The instruction loop: runs one activation until it completes,
//! suspends, or faults.
//!
//! The only suspension points are the `Sleep` and `Waitfor`
//! instructions; everything else runs to the next instruction without
//! yielding. The loop never touches anything outside the instance's
//! own locals and the verb table, which is what lets many instances
//! interleave without synchronization.

use cog_script::{Instr, MessageId, Script, Value, VerbTable};

use crate::error::Fault;
use crate::instance::Continuation;

/// Upper bound on instructions per activation. A handler that spins
/// without suspending faults with [`Fault::BudgetExhausted`] instead
/// of stalling the tick loop.
pub const ACTIVATION_BUDGET: u64 = 1 << 20;

/// How one activation ended.
#[derive(Debug)]
pub enum Outcome {
    /// Ran to a `Return` (or off the end of the code).
    Finished,
    /// Hit `Sleep`; resume the continuation after `duration` seconds.
    Slept { duration: f64, cont: Continuation },
    /// Hit `Waitfor`; resume the continuation when `message` arrives.
    Waited {
        message: MessageId,
        cont: Continuation,
    },
    Faulted(Fault),
}

/// Execute from the continuation until the activation suspends,
/// finishes, or faults.
pub fn run(
    script: &Script,
    locals: &mut [Value],
    verbs: &mut VerbTable,
    cont: Continuation,
) -> Outcome {
    match run_inner(script, locals, verbs, cont) {
        Ok(outcome) => outcome,
        Err(fault) => Outcome::Faulted(fault),
    }
}

fn run_inner(
    script: &Script,
    locals: &mut [Value],
    verbs: &mut VerbTable,
    cont: Continuation,
) -> Result<Outcome, Fault> {
    let Continuation { mut pc, mut stack } = cont;
    let mut budget = ACTIVATION_BUDGET;

    loop {
        let Some(instr) = script.code.get(pc as usize) else {
            return Ok(Outcome::Finished);
        };
        if budget == 0 {
            return Err(Fault::BudgetExhausted);
        }
        budget -= 1;
        pc += 1;

        match *instr {
            Instr::PushInt(v) => stack.push(Value::Int(v)),
            Instr::PushFloat(v) => stack.push(Value::Float(v)),
            Instr::PushVector(v) => stack.push(Value::Vector(v)),
            Instr::LoadSlot(slot) => {
                let value = locals
                    .get(slot as usize)
                    .copied()
                    .ok_or(Fault::InvalidSlot(slot))?;
                stack.push(value);
            }
            Instr::StoreSlot(slot) => {
                let value = pop(&mut stack)?;
                *locals
                    .get_mut(slot as usize)
                    .ok_or(Fault::InvalidSlot(slot))? = value;
            }
            Instr::Unary(op) => {
                let v = pop(&mut stack)?;
                stack.push(Value::unary(op, v)?);
            }
            Instr::Binary(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(Value::binary(op, left, right)?);
            }
            Instr::CallVerb(id) => {
                let arity = verbs.arity(id);
                let mut args = Vec::with_capacity(arity);
                for _ in 0..arity {
                    args.push(pop(&mut stack)?);
                }
                args.reverse();
                match verbs.invoke(id, &args) {
                    Ok(Some(result)) => stack.push(result),
                    Ok(None) => {}
                    Err(source) => {
                        return Err(Fault::Verb {
                            verb: verbs.name(id).to_string(),
                            source,
                        })
                    }
                }
            }
            Instr::Discard => {
                pop(&mut stack)?;
            }
            Instr::Jump(target) => pc = target,
            Instr::JumpIfFalse(target) => {
                if !pop(&mut stack)?.is_truthy() {
                    pc = target;
                }
            }
            Instr::Sleep => {
                let duration = pop(&mut stack)?
                    .as_float()
                    .ok_or(Fault::NonNumericSleep)?;
                return Ok(Outcome::Slept {
                    duration: duration as f64,
                    cont: Continuation { pc, stack },
                });
            }
            Instr::Waitfor(message) => {
                return Ok(Outcome::Waited {
                    message,
                    cont: Continuation { pc, stack },
                });
            }
            Instr::Return => return Ok(Outcome::Finished),
        }
    }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, Fault> {
    stack.pop().ok_or(Fault::StackUnderflow)
}
