//! Delayed effects, drained at the start of every tick.
//!
//! Replaces fire-and-forget timers: the simulation decides when an event
//! is due by comparing against the tick's clock, so tests never wait.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScheduledEvent {
    RespawnPlayer,
    /// Bleed off the boss's charge velocity.
    EndBossCharge,
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    // (due time, insertion order) keeps same-time events FIFO
    heap: BinaryHeap<Reverse<(u64, u64, ScheduledEvent)>>,
    seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, event: ScheduledEvent) {
        self.heap.push(Reverse((due, self.seq, event)));
        self.seq += 1;
    }

    /// Remove and return every event due at or before `now`, oldest first.
    pub fn drain_due(&mut self, now: u64) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        while let Some(Reverse((at, _, _))) = self.heap.peek() {
            if *at > now {
                break;
            }
            if let Some(Reverse((_, _, event))) = self.heap.pop() {
                due.push(event);
            }
        }
        due
    }

    pub fn is_pending(&self, event: ScheduledEvent) -> bool {
        self.heap.iter().any(|Reverse((_, _, e))| *e == event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
