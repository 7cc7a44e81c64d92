//! Toast store
//!
//! The single authority over which toasts exist, how many times each was
//! triggered and when each goes away. Every mutation is synchronous; removing
//! a record always cancels its deadline and releases its dedup entry in the
//! same call.
//!
//! Consumers observe the store through [`StoreSubscription`]s, which receive a
//! [`StoreChange`] for every mutation.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, trace};

use super::dedup::{DedupIndex, Fingerprint};
use super::timers::TimerQueue;
use super::{ToastDuration, ToastId, ToastOptions, ToastRecord, ToastVariant};
use crate::clock::{Clock, SystemClock};
use crate::config::ToastConfig;

/// Why a record left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Explicit dismiss
    Dismissed,
    /// Its auto-dismiss deadline passed
    Expired,
}

/// A mutation of the active set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// A new record was created
    Added(ToastId),
    /// An existing record was re-triggered
    Refreshed {
        /// Record that absorbed the repeat
        id: ToastId,
        /// Occurrences so far
        count: u32,
    },
    /// A record was removed
    Removed {
        /// Record that left
        id: ToastId,
        /// Dismissed or expired
        reason: RemovalReason,
    },
    /// Every record was removed at once
    Cleared {
        /// Records removed
        removed: usize,
    },
}

impl StoreChange {
    /// Whether this change alters the number of active toasts
    pub fn affects_size(&self) -> bool {
        !matches!(self, StoreChange::Refreshed { .. })
    }
}

/// Receiving end of store change notifications
#[derive(Debug)]
pub struct StoreSubscription {
    receiver: mpsc::Receiver<StoreChange>,
}

impl StoreSubscription {
    /// Take every pending change (non-blocking)
    pub fn drain(&self) -> Vec<StoreChange> {
        self.receiver.try_iter().collect()
    }

}

/// Registry of active toasts
pub struct ToastStore {
    config: ToastConfig,
    clock: Arc<dyn Clock>,
    /// Keyed by id; ids are issued in creation order, so iteration is oldest first
    records: BTreeMap<ToastId, ToastRecord>,
    dedup: DedupIndex,
    timers: TimerQueue,
    listeners: Vec<mpsc::Sender<StoreChange>>,
    next_id: u64,
}

impl ToastStore {
    /// Create a store on the system clock
    pub fn new(config: ToastConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a store on a custom clock
    pub fn with_clock(config: ToastConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            records: BTreeMap::new(),
            dedup: DedupIndex::new(),
            timers: TimerQueue::new(),
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ToastConfig {
        &self.config
    }

    /// Replace the configuration; applies to later operations only
    pub fn apply_config(&mut self, config: ToastConfig) {
        debug!(?config, "Applying toast config");
        self.config = config;
    }

    /// Create a toast, or fold it into a live one with the same fingerprint
    pub fn create(&mut self, variant: ToastVariant, options: ToastOptions) -> ToastId {
        let now = self.clock.now();
        let window = self.config.dedup_window();
        let fingerprint = Fingerprint::new(variant, &options.message, options.normalized_details());

        self.dedup.sweep_expired(now);

        if let Some(entry) = self.dedup.touch(&fingerprint, now, window) {
            if self.records.contains_key(&entry.id) {
                self.refresh(entry.id, entry.count, now, options);
                return entry.id;
            }
            // Entry outlived its record; treat as a first occurrence
            self.dedup.remove_owned(&fingerprint, entry.id);
        }

        let id = ToastId(self.next_id);
        self.next_id += 1;

        let duration = options
            .duration
            .unwrap_or_else(|| self.config.default_duration(variant));
        let details = options.normalized_details().map(str::to_string);

        let record = ToastRecord {
            id,
            variant,
            message: options.message,
            details,
            correlation_id: options.correlation_id,
            duration,
            count: 1,
            test_id: options.test_id,
            created_at: now,
            last_updated_at: now,
            created_wall: Local::now(),
        };

        debug!(
            id = %id,
            variant = %variant,
            message = %record.message,
            duration_ms = ?duration.as_millis(),
            "Toast created"
        );

        self.records.insert(id, record);
        self.dedup.insert(fingerprint, id, now, window);
        self.arm_timer(id, duration, now);
        self.emit(StoreChange::Added(id));
        id
    }

    /// Create a success toast
    pub fn success(&mut self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Success, options.into())
    }

    /// Create an error toast
    pub fn error(&mut self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Error, options.into())
    }

    /// Create a warning toast
    pub fn warning(&mut self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Warning, options.into())
    }

    /// Create an info toast
    pub fn info(&mut self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Info, options.into())
    }

    /// Remove a toast now; unknown ids are ignored
    pub fn dismiss(&mut self, id: ToastId) {
        if !self.remove(id, RemovalReason::Dismissed) {
            trace!(id = %id, "Dismiss of unknown toast ignored");
        }
    }

    /// Remove every toast and forget every fingerprint
    pub fn dismiss_all(&mut self) {
        let removed = self.records.len();
        let cancelled = self.timers.clear();
        self.records.clear();
        self.dedup.clear();

        debug!(removed, cancelled_timers = cancelled, "All toasts dismissed");

        if removed > 0 {
            self.emit(StoreChange::Cleared { removed });
        }
    }

    /// Clear everything including the id sequence
    pub fn reset(&mut self) {
        self.dismiss_all();
        self.next_id = 1;
    }

    /// Fire every deadline that has passed, returning the expired ids
    pub fn tick(&mut self) -> Vec<ToastId> {
        let now = self.clock.now();
        let due = self.timers.take_due(now);
        for id in &due {
            self.remove(*id, RemovalReason::Expired);
        }
        due
    }

    /// Delay until the earliest pending deadline
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.timers.time_until_next(self.clock.now())
    }

    /// Whether a toast currently has a pending deadline
    pub fn has_timer(&self, id: ToastId) -> bool {
        self.timers.is_scheduled(id)
    }

    /// Subscribe to change notifications
    ///
    /// The channel is unbounded: changes accumulate until the subscriber
    /// drains them, so every subscription must be drained regularly (views do
    /// this in `sync()`) or dropped. Dropped subscriptions are pruned on the
    /// next change.
    pub fn subscribe(&mut self) -> StoreSubscription {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        StoreSubscription { receiver: rx }
    }

    /// Number of active toasts
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no toast is active
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a toast
    pub fn get(&self, id: ToastId) -> Option<&ToastRecord> {
        self.records.get(&id)
    }

    /// Active toasts, oldest first
    pub fn records(&self) -> impl Iterator<Item = &ToastRecord> {
        self.records.values()
    }

    /// The oldest `limit` toasts
    pub fn visible(&self, limit: usize) -> Vec<ToastRecord> {
        self.records.values().take(limit).cloned().collect()
    }

    /// Number of entries in the dedup index
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }

    fn refresh(&mut self, id: ToastId, count: u32, now: Instant, options: ToastOptions) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };

        record.count = count;
        record.last_updated_at = now;
        if options.correlation_id.is_some() {
            record.correlation_id = options.correlation_id;
        }
        if let Some(duration) = options.duration {
            record.duration = duration;
        }
        if options.test_id.is_some() {
            record.test_id = options.test_id;
        }
        let duration = record.duration;

        debug!(id = %id, count, "Toast deduplicated");

        self.arm_timer(id, duration, now);
        self.emit(StoreChange::Refreshed { id, count });
    }

    fn arm_timer(&mut self, id: ToastId, duration: ToastDuration, now: Instant) {
        // An interval past what Instant can hold behaves as persistent
        match duration.as_duration().and_then(|interval| now.checked_add(interval)) {
            Some(deadline) => {
                if self.timers.schedule(id, deadline).is_some() {
                    trace!(id = %id, "Replaced pending timer");
                }
            }
            None => {
                self.timers.cancel(id);
            }
        }
    }

    fn remove(&mut self, id: ToastId, reason: RemovalReason) -> bool {
        let Some(record) = self.records.remove(&id) else {
            return false;
        };

        self.timers.cancel(id);
        self.dedup.remove_owned(&record.fingerprint(), id);

        debug!(id = %id, ?reason, remaining = self.records.len(), "Toast removed");

        self.emit(StoreChange::Removed { id, reason });
        true
    }

    fn emit(&mut self, change: StoreChange) {
        // Dropped subscriptions are pruned on the next emit
        self.listeners.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}
