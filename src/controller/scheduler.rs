//! Cancelable delayed mutations.

use crate::types::ItemId;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Identifier of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// A store mutation requested by a gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Increment(ItemId),
    Remove(ItemId),
}

struct Pending {
    id: TaskId,
    /// `None` when the deadline lies beyond what `Instant` can represent.
    due: Option<Instant>,
    mutation: Mutation,
}

/// Timer queue driven by an explicit clock.
///
/// Nothing fires on its own: the owner calls [`Scheduler::take_due`] with
/// the current time and runs what comes back.
#[derive(Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `mutation` to run `delay` after `now`.
    ///
    /// A delay too large to represent never comes due; the task stays
    /// pending until cancelled.
    pub fn schedule(&mut self, now: Instant, delay: Duration, mutation: Mutation) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let due = now.checked_add(delay);
        if due.is_none() {
            warn!(task = id.0, ?delay, "delay out of range, task will never run");
        }
        self.pending.push(Pending { id, due, mutation });
        trace!(task = id.0, ?mutation, ?delay, "scheduled mutation");
        id
    }

    /// Cancel one task. Returns false if it already ran or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending task, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Remove and return every task due at `now`, earliest first. Tasks due
    /// at the same instant keep their scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<Mutation> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|task| task.due.is_some_and(|due| due <= now));
        self.pending = rest;
        due.sort_by_key(|task| (task.due, task.id.0));
        due.into_iter().map(|task| task.mutation).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// When the earliest pending task becomes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().filter_map(|task| task.due).min()
    }
}
