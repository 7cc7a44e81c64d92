//! Toast notification core
//!
//! This module holds the toast data model and the engine around it:
//!
//! - [`dedup`]: fingerprint index that folds repeated toasts into one record
//! - [`timers`]: per-record auto-dismiss deadlines
//! - [`store`]: the registry of active toasts and its change notifications
//! - [`handle`]: shared [`Toaster`] handle and the process-wide instance

pub mod dedup;
pub mod handle;
pub mod store;
pub mod timers;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub use dedup::{DedupEntry, DedupIndex, Fingerprint};
pub use handle::Toaster;
pub use store::{RemovalReason, StoreChange, StoreSubscription, ToastStore};
pub use timers::TimerQueue;

/// Default auto-dismiss for success toasts
pub const DEFAULT_SUCCESS_MS: u64 = 3000;
/// Default auto-dismiss for info toasts
pub const DEFAULT_INFO_MS: u64 = 4000;
/// Default auto-dismiss for warning toasts
pub const DEFAULT_WARNING_MS: u64 = 5000;
/// Sliding deduplication window
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Number of toasts shown at once
pub const DEFAULT_MAX_VISIBLE: usize = 3;

/// Toast severity / visual treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    /// Operation completed
    Success,
    /// Operation failed; persistent by default
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

impl ToastVariant {
    /// All variants in display order
    pub const ALL: [ToastVariant; 4] = [
        ToastVariant::Success,
        ToastVariant::Error,
        ToastVariant::Warning,
        ToastVariant::Info,
    ];

    /// Lowercase name, matching the bus payload `type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastVariant::Success => "success",
            ToastVariant::Error => "error",
            ToastVariant::Warning => "warning",
            ToastVariant::Info => "info",
        }
    }

    /// Icon shown next to the message
    pub fn icon(&self) -> &'static str {
        match self {
            ToastVariant::Success => "✓",
            ToastVariant::Error => "✕",
            ToastVariant::Warning => "⚠",
            ToastVariant::Info => "ℹ",
        }
    }

    /// Built-in auto-dismiss behaviour, before any configuration
    pub fn default_duration(&self) -> ToastDuration {
        match self {
            ToastVariant::Success => ToastDuration::from_millis(DEFAULT_SUCCESS_MS),
            ToastVariant::Info => ToastDuration::from_millis(DEFAULT_INFO_MS),
            ToastVariant::Warning => ToastDuration::from_millis(DEFAULT_WARNING_MS),
            ToastVariant::Error => ToastDuration::Persistent,
        }
    }
}

impl fmt::Display for ToastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ToastVariant::Success),
            "error" => Ok(ToastVariant::Error),
            "warning" => Ok(ToastVariant::Warning),
            "info" => Ok(ToastVariant::Info),
            other => Err(format!(
                "unknown toast type '{}', expected success, error, warning or info",
                other
            )),
        }
    }
}

/// How long a toast stays before dismissing itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDuration {
    /// Auto-dismiss after the given interval
    Timed(Duration),
    /// Stays until dismissed
    Persistent,
}

impl ToastDuration {
    /// Timed duration from milliseconds
    pub fn from_millis(ms: u64) -> Self {
        ToastDuration::Timed(Duration::from_millis(ms))
    }

    /// The interval, if any
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            ToastDuration::Timed(d) => Some(*d),
            ToastDuration::Persistent => None,
        }
    }

    /// Milliseconds, if timed
    pub fn as_millis(&self) -> Option<u64> {
        self.as_duration().map(|d| d.as_millis() as u64)
    }

    /// Whether this toast never auto-dismisses
    pub fn is_persistent(&self) -> bool {
        matches!(self, ToastDuration::Persistent)
    }
}

/// Opaque toast identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

impl FromStr for ToastId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("toast-").unwrap_or(s);
        raw.parse::<u64>()
            .map(ToastId)
            .map_err(|_| format!("invalid toast id '{}'", s))
    }
}

/// Options for creating a toast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastOptions {
    /// Display text
    pub message: String,
    /// Secondary text, only reachable through the copy action
    pub details: Option<String>,
    /// Cross-reference into external logs
    pub correlation_id: Option<String>,
    /// Override for the variant's default duration
    pub duration: Option<ToastDuration>,
    /// Caller supplied test identifier
    pub test_id: Option<String>,
}

impl ToastOptions {
    /// Options with just a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach secondary details
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach a correlation id
    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Override the auto-dismiss interval in milliseconds
    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration = Some(ToastDuration::from_millis(ms));
        self
    }

    /// Never auto-dismiss
    pub fn persistent(mut self) -> Self {
        self.duration = Some(ToastDuration::Persistent);
        self
    }

    /// Attach a test identifier
    pub fn test_id(mut self, id: impl Into<String>) -> Self {
        self.test_id = Some(id.into());
        self
    }

    /// Details with empty strings treated as absent
    pub fn normalized_details(&self) -> Option<&str> {
        self.details.as_deref().filter(|d| !d.is_empty())
    }
}

impl From<&str> for ToastOptions {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ToastOptions {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A single active notification
#[derive(Debug, Clone)]
pub struct ToastRecord {
    /// Stable identifier
    pub id: ToastId,
    /// Severity
    pub variant: ToastVariant,
    /// Display text
    pub message: String,
    /// Secondary text
    pub details: Option<String>,
    /// Most recently supplied correlation id
    pub correlation_id: Option<String>,
    /// Effective auto-dismiss interval
    pub duration: ToastDuration,
    /// Number of occurrences folded into this record
    pub count: u32,
    /// Caller supplied test identifier
    pub test_id: Option<String>,
    /// When the record was created
    pub created_at: Instant,
    /// When the record was last created or refreshed
    pub last_updated_at: Instant,
    /// Wall-clock creation time, for display
    pub created_wall: DateTime<Local>,
}

impl ToastRecord {
    /// Dedup key of this record
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.variant, &self.message, self.details.as_deref())
    }

    /// Whether the record has been triggered more than once
    pub fn is_repeated(&self) -> bool {
        self.count > 1
    }
}
