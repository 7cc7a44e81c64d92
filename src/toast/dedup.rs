//! Deduplication index
//!
//! Maps a toast fingerprint to the record currently showing it. Each repeat
//! pushes the entry's expiry forward by the window, so the window slides from
//! the most recent occurrence rather than the first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::trace;

use super::{ToastId, ToastVariant};

/// Content identity of a toast
///
/// Only variant, message and details take part. Correlation ids and
/// durations do not, so a storm of errors carrying per-request ids still
/// folds into one toast.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    variant: ToastVariant,
    message: String,
    details: Option<String>,
}

impl Fingerprint {
    /// Build a fingerprint; empty details count as none
    pub fn new(variant: ToastVariant, message: &str, details: Option<&str>) -> Self {
        Self {
            variant,
            message: message.to_string(),
            details: details.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }

}

/// Index value for a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupEntry {
    /// Record showing this fingerprint
    pub id: ToastId,
    /// Occurrences seen inside the window
    pub count: u32,
    /// When the entry stops matching; `None` if the window reaches past
    /// what `Instant` can represent
    pub expires_at: Option<Instant>,
}

impl DedupEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// Fingerprint -> entry index with lazy expiry
#[derive(Debug, Default)]
pub struct DedupIndex {
    entries: HashMap<Fingerprint, DedupEntry>,
}

impl DedupIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry whose expiry has passed, returning how many went
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let swept = before - self.entries.len();
        if swept > 0 {
            trace!(swept, remaining = self.entries.len(), "Swept expired dedup entries");
        }
        swept
    }

    /// Live entry for a fingerprint, if any
    pub fn lookup(&self, fingerprint: &Fingerprint, now: Instant) -> Option<DedupEntry> {
        self.entries
            .get(fingerprint)
            .filter(|entry| entry.is_live(now))
            .copied()
    }

    /// Record a repeat of a live fingerprint
    ///
    /// Increments the count and slides the expiry to `now + window`. Returns
    /// the updated entry, or `None` if no live entry exists.
    pub fn touch(
        &mut self,
        fingerprint: &Fingerprint,
        now: Instant,
        window: Duration,
    ) -> Option<DedupEntry> {
        let entry = self.entries.get_mut(fingerprint)?;
        if !entry.is_live(now) {
            return None;
        }
        entry.count = entry.count.saturating_add(1);
        entry.expires_at = now.checked_add(window);
        Some(*entry)
    }

    /// Register the first occurrence of a fingerprint
    pub fn insert(&mut self, fingerprint: Fingerprint, id: ToastId, now: Instant, window: Duration) {
        self.entries.insert(
            fingerprint,
            DedupEntry {
                id,
                count: 1,
                expires_at: now.checked_add(window),
            },
        );
    }

    /// Remove the entry for a fingerprint if it still belongs to `id`
    ///
    /// A newer record may have claimed the fingerprint after the old entry
    /// expired; that entry must survive the old record's removal.
    pub fn remove_owned(&mut self, fingerprint: &Fingerprint, id: ToastId) -> bool {
        match self.entries.get(fingerprint) {
            Some(entry) if entry.id == id => {
                self.entries.remove(fingerprint);
                true
            }
            _ => false,
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, live or not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
