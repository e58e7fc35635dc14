//! Instances and the generational pool that owns them.
//!
//! Instance identity is a handle (index + generation) rather than a
//! reference, so a continuation can safely outlive its instance: a
//! handle is revalidated before every resumption and a dead one is
//! silently dropped.

use std::sync::Arc;

use cog_script::{MessageId, Script, Value};

use crate::error::Fault;

/// Saved execution state of a suspended activation. Resumption
/// restores the program counter and operand stack exactly as
/// snapshotted.
#[derive(Debug, Clone)]
pub struct Continuation {
    pub pc: u32,
    pub stack: Vec<Value>,
}

impl Continuation {
    /// A fresh activation starting at a handler entry point.
    pub fn at_entry(pc: u32) -> Self {
        Self {
            pc,
            stack: Vec::new(),
        }
    }
}

/// Per-instance suspension state.
#[derive(Debug)]
pub enum ExecState {
    /// Not running a handler; ready to receive messages.
    Idle,
    /// Suspended on a timer. The continuation lives in the scheduler
    /// queue, keyed by wake time.
    Sleeping,
    /// At least one activation is parked in `waitfor`; the
    /// continuations live in [`Instance::waiters`]. Messages matching
    /// no waiter are dropped.
    Waiting,
    /// Faulted. Ignores all further delivery and resumption.
    Halted(Fault),
}

/// A message-keyed continuation parked by `waitfor`. Overlapping
/// activations may each park one; deliveries resume them in
/// registration order.
#[derive(Debug)]
pub struct Waiter {
    pub message: MessageId,
    pub cont: Continuation,
}

/// One running copy of a script, bound to an entity.
pub struct Instance {
    pub script: Arc<Script>,
    /// Local storage, one value per symbol table entry.
    pub locals: Vec<Value>,
    pub state: ExecState,
    /// Continuations awaiting a message, in registration order.
    pub waiters: Vec<Waiter>,
}

impl Instance {
    pub fn new(script: Arc<Script>) -> Self {
        let locals = script.default_locals();
        Self {
            script,
            locals,
            state: ExecState::Idle,
            waiters: Vec::new(),
        }
    }

    /// Write the call-scoped message context into the reserved
    /// parameter slots. Missing params are zeroed, so a handler never
    /// observes a previous delivery's values.
    pub fn write_params(&mut self, sender: i32, source: i32, params: &[Value]) {
        let base = self.script.param_base as usize;
        self.locals[base] = Value::Int(sender);
        self.locals[base + 1] = Value::Int(source);
        for i in 0..4 {
            self.locals[base + 2 + i] = params.get(i).copied().unwrap_or(Value::Int(0));
        }
    }
}

/// Stable identity of a pool slot at a point in time. Stale handles
/// (outlived by a destroy) compare unequal to the slot's current
/// generation and resolve to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    instance: Option<Instance>,
}

/// Generational instance pool. Freed slots are reused with a bumped
/// generation.
#[derive(Default)]
pub struct InstancePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl InstancePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) -> InstanceHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.instance = Some(instance);
                InstanceHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    instance: Some(instance),
                });
                InstanceHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<&Instance> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.instance.as_ref()
    }

    pub fn get_mut(&mut self, handle: InstanceHandle) -> Option<&mut Instance> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.instance.as_mut()
    }

    /// Remove an instance, invalidating every outstanding handle and
    /// continuation that references it.
    pub fn remove(&mut self, handle: InstanceHandle) {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return;
        };
        if slot.generation != handle.generation || slot.instance.is_none() {
            return;
        }
        slot.instance = None;
        slot.generation += 1;
        self.free.push(handle.index);
    }

    pub fn is_live(&self, handle: InstanceHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Handles of all live instances in slot order (stable across a
    /// broadcast).
    pub fn live_handles(&self) -> Vec<InstanceHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.instance.is_some())
            .map(|(i, s)| InstanceHandle {
                index: i as u32,
                generation: s.generation,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cog_script::Script;

    fn empty_script() -> Arc<Script> {
        Arc::new(Script {
            code: Vec::new(),
            symbols: Vec::new(),
            messages: Vec::new(),
            entries: Vec::new(),
            param_base: 0,
        })
    }

    #[test]
    fn test_stale_handle_resolves_to_nothing() {
        let mut pool = InstancePool::new();
        let handle = pool.insert(Instance::new(empty_script()));
        assert!(pool.is_live(handle));

        pool.remove(handle);
        assert!(!pool.is_live(handle));
        assert!(pool.get(handle).is_none());

        // The slot is reused under a new generation; the old handle
        // stays dead.
        let reused = pool.insert(Instance::new(empty_script()));
        assert!(pool.is_live(reused));
        assert!(!pool.is_live(handle));
        assert_ne!(handle, reused);
    }

    #[test]
    fn test_double_remove_is_harmless() {
        let mut pool = InstancePool::new();
        let handle = pool.insert(Instance::new(empty_script()));
        pool.remove(handle);
        pool.remove(handle);
        assert_eq!(pool.live_handles().len(), 0);
    }
}
