//! Auto-dismiss deadlines
//!
//! Each timed record owns at most one pending deadline. Scheduling a record
//! again replaces its deadline, so a refreshed toast cannot fire early or
//! twice. The host event loop polls [`TimerQueue::time_until_next`] and calls
//! the store's `tick` when something is due.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::ToastId;

/// Pending deadlines keyed by toast
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: HashMap<ToastId, Instant>,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline for a toast, returning the one it replaced
    pub fn schedule(&mut self, id: ToastId, deadline: Instant) -> Option<Instant> {
        self.deadlines.insert(id, deadline)
    }

    /// Cancel a toast's deadline
    pub fn cancel(&mut self, id: ToastId) -> bool {
        self.deadlines.remove(&id).is_some()
    }

    /// Cancel everything, returning how many were pending
    pub fn clear(&mut self) -> usize {
        let pending = self.deadlines.len();
        self.deadlines.clear();
        pending
    }

    /// Whether a toast has a pending deadline
    pub fn is_scheduled(&self, id: ToastId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Remove and return every toast whose deadline is at or before `now`,
    /// earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<ToastId> {
        let mut due: Vec<(Instant, ToastId)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.deadlines.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Time from `now` until the earliest deadline, zero if already due
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Number of pending deadlines
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
