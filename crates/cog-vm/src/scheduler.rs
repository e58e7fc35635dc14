//! The timer queue: continuations suspended on the simulation clock.
//!
//! Ordered by wake time with registration order breaking ties, so a
//! given sequence of sleeps always resumes in the same order. Message
//! continuations never live here; `send_message` resumes those out of
//! band.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::instance::{Continuation, InstanceHandle};

struct TimerEntry {
    wake: f64,
    seq: u64,
    handle: InstanceHandle,
    cont: Continuation,
}

// Min-heap order: earliest wake first, then registration order. Wake
// times are never NaN (negative and non-finite sleeps are clamped at
// scheduling).
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .wake
            .total_cmp(&self.wake)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimerEntry {}

/// The simulation clock and its pending timers. Time is externally
/// driven seconds, never wall clock, so runs are reproducible.
#[derive(Default)]
pub struct Scheduler {
    clock: f64,
    next_seq: u64,
    queue: BinaryHeap<TimerEntry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in seconds.
    pub fn now(&self) -> f64 {
        self.clock
    }

    pub fn advance(&mut self, dt: f64) {
        self.clock += dt;
    }

    /// Register a timer continuation to wake `duration` seconds from
    /// now. Non-finite and negative durations wake on the next tick.
    pub fn schedule(&mut self, duration: f64, handle: InstanceHandle, cont: Continuation) {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimerEntry {
            wake: self.clock + duration,
            seq,
            handle,
            cont,
        });
    }

    /// Drain every continuation whose wake time has elapsed, in wake
    /// then registration order. Entries scheduled during the resulting
    /// resumptions wait for the next call even if already due.
    pub fn take_due(&mut self) -> Vec<(InstanceHandle, Continuation)> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|entry| entry.wake <= self.clock)
        {
            if let Some(entry) = self.queue.pop() {
                due.push((entry.handle, entry.cont));
            }
        }
        due
    }

    /// Drop every pending timer that references `handle`.
    pub fn cancel(&mut self, handle: InstanceHandle) {
        self.queue.retain(|entry| entry.handle != handle);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
