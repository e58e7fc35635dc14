//! The engine-facing runtime: instance lifecycle, message delivery,
//! and the per-tick scheduler drive.
//!
//! Single-threaded and cooperative. Exactly one instance executes at
//! any moment, and only `sleep`/`waitfor` yield, so verbs may mutate
//! shared level state without locking.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use cog_script::{Script, Value, VerbTable};

use crate::error::Fault;
use crate::exec::{self, Outcome};
use crate::instance::{Continuation, ExecState, Instance, InstanceHandle, InstancePool, Waiter};
use crate::scheduler::Scheduler;

/// The Cog runtime. Owns the verb table, the instance pool, and the
/// timer scheduler.
pub struct Runtime {
    verbs: VerbTable,
    pool: InstancePool,
    scheduler: Scheduler,
}

impl Runtime {
    pub fn new(verbs: VerbTable) -> Self {
        Self {
            verbs,
            pool: InstancePool::new(),
            scheduler: Scheduler::new(),
        }
    }

    /// The verb table, for compiling scripts against this runtime.
    pub fn verbs(&self) -> &VerbTable {
        &self.verbs
    }

    /// Current simulation time in seconds.
    pub fn clock(&self) -> f64 {
        self.scheduler.now()
    }

    /// Pending timer continuations, across all instances.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Create an instance of a compiled script. `overrides` replace
    /// symbol defaults by name (level-placed values); unknown names are
    /// skipped with a warning.
    pub fn instantiate(
        &mut self,
        script: Arc<Script>,
        overrides: &[(&str, Value)],
    ) -> InstanceHandle {
        let mut instance = Instance::new(script);
        for (name, value) in overrides {
            match instance.script.symbol_slot(name) {
                Some(slot) => instance.locals[slot as usize] = *value,
                None => warn!(symbol = %name, "override for undeclared symbol skipped"),
            }
        }
        let handle = self.pool.insert(instance);
        debug!(?handle, "instance created");
        handle
    }

    /// Destroy an instance, cancelling every continuation that
    /// references it. A stale handle is a no-op.
    pub fn destroy(&mut self, handle: InstanceHandle) {
        self.scheduler.cancel(handle);
        self.pool.remove(handle);
        debug!(?handle, "instance destroyed");
    }

    pub fn is_live(&self, handle: InstanceHandle) -> bool {
        self.pool.is_live(handle)
    }

    /// The fault that halted an instance, if any.
    pub fn fault(&self, handle: InstanceHandle) -> Option<&Fault> {
        match &self.pool.get(handle)?.state {
            ExecState::Halted(fault) => Some(fault),
            _ => None,
        }
    }

    /// Read a symbol's current value from an instance's local storage.
    pub fn read_symbol(&self, handle: InstanceHandle, name: &str) -> Option<Value> {
        let instance = self.pool.get(handle)?;
        let slot = instance.script.symbol_slot(name)?;
        instance.locals.get(slot as usize).copied()
    }

    // ── Message delivery ──────────────────────────────────────────────────────

    /// Deliver a message to one instance. Resumes a matching `waitfor`
    /// continuation if there is one; otherwise starts the label's
    /// handler fresh. No handler, a non-matching wait, a halted
    /// instance, or a stale handle all make this a no-op.
    pub fn send_message(
        &mut self,
        handle: InstanceHandle,
        label: &str,
        sender: i32,
        source: i32,
        params: &[Value],
    ) {
        let Some(instance) = self.pool.get_mut(handle) else {
            return;
        };
        let Some(id) = instance.script.message_id(label) else {
            return;
        };

        if matches!(instance.state, ExecState::Halted(_)) {
            return;
        }
        if let Some(pos) = instance.waiters.iter().position(|w| w.message == id) {
            let waiter = instance.waiters.remove(pos);
            instance.write_params(sender, source, params);
            debug!(?handle, %label, "waitfor resumed");
            self.run_activation(handle, waiter.cont);
        } else if !instance.waiters.is_empty() {
            // Blocked on other labels; this message is dropped.
        } else if let Some(entry) = instance.script.entry_point(id) {
            instance.write_params(sender, source, params);
            self.run_activation(handle, Continuation::at_entry(entry));
        }
    }

    /// Deliver a message to every live instance, in stable pool order.
    pub fn send_all(&mut self, label: &str, sender: i32, source: i32, params: &[Value]) {
        for handle in self.pool.live_handles() {
            self.send_message(handle, label, sender, source, params);
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────────

    /// Advance the simulation clock by `dt` seconds and resume every
    /// timer continuation that has come due, earliest first.
    pub fn tick(&mut self, dt: f64) {
        self.scheduler.advance(dt);
        for (handle, cont) in self.scheduler.take_due() {
            let Some(instance) = self.pool.get(handle) else {
                // Destroyed since scheduling; the continuation dies here.
                debug!(?handle, "stale timer continuation dropped");
                continue;
            };
            if matches!(instance.state, ExecState::Halted(_)) {
                continue;
            }
            self.run_activation(handle, cont);
        }
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    fn run_activation(&mut self, handle: InstanceHandle, cont: Continuation) {
        let Some(instance) = self.pool.get_mut(handle) else {
            return;
        };
        let outcome = exec::run(&instance.script, &mut instance.locals, &mut self.verbs, cont);
        match outcome {
            Outcome::Finished => {
                // Waiters parked by other activations stay registered.
                instance.state = if instance.waiters.is_empty() {
                    ExecState::Idle
                } else {
                    ExecState::Waiting
                };
            }
            Outcome::Slept { duration, cont } => {
                trace!(?handle, duration, "instance sleeping");
                instance.state = if instance.waiters.is_empty() {
                    ExecState::Sleeping
                } else {
                    ExecState::Waiting
                };
                self.scheduler.schedule(duration, handle, cont);
            }
            Outcome::Waited { message, cont } => {
                trace!(?handle, message = message.0, "instance waiting");
                instance.waiters.push(Waiter { message, cont });
                instance.state = ExecState::Waiting;
            }
            Outcome::Faulted(fault) => {
                warn!(?handle, %fault, "instance halted on fault");
                instance.waiters.clear();
                instance.state = ExecState::Halted(fault);
            }
        }
    }
}
