//! Shared toast handle
//!
//! [`Toaster`] is the imperative API the rest of an application calls. It is a
//! cheap clone over one [`ToastStore`], and [`Toaster::global`] gives the
//! process-wide instance so any code path can raise a toast without plumbing.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use tracing::debug;

use super::store::{StoreSubscription, ToastStore};
use super::{ToastId, ToastOptions, ToastRecord, ToastVariant};
use crate::clock::Clock;
use crate::config::ToastConfig;
use crate::report::AppError;

static GLOBAL: OnceLock<Toaster> = OnceLock::new();

/// Cloneable handle to a toast store
#[derive(Clone)]
pub struct Toaster {
    store: Arc<Mutex<ToastStore>>,
}

impl Toaster {
    /// Create a handle over a fresh store
    pub fn new(config: ToastConfig) -> Self {
        Self::from_store(ToastStore::new(config))
    }

    /// Create a handle over a fresh store on a custom clock
    pub fn with_clock(config: ToastConfig, clock: Arc<dyn Clock>) -> Self {
        Self::from_store(ToastStore::with_clock(config, clock))
    }

    /// Wrap an existing store
    pub fn from_store(store: ToastStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// The process-wide toaster, created with default config on first use
    pub fn global() -> &'static Toaster {
        GLOBAL.get_or_init(|| {
            debug!("Initializing global toaster");
            Toaster::new(ToastConfig::default())
        })
    }

    fn lock(&self) -> MutexGuard<'_, ToastStore> {
        // A panic inside a store call leaves the maps consistent, so keep going
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a toast of the given variant
    pub fn create(&self, variant: ToastVariant, options: impl Into<ToastOptions>) -> ToastId {
        self.lock().create(variant, options.into())
    }

    /// Success toast, auto-dismisses after 3s by default
    pub fn success(&self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Success, options)
    }

    /// Error toast, stays until dismissed by default
    pub fn error(&self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Error, options)
    }

    /// Warning toast, auto-dismisses after 5s by default
    pub fn warning(&self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Warning, options)
    }

    /// Info toast, auto-dismisses after 4s by default
    pub fn info(&self, options: impl Into<ToastOptions>) -> ToastId {
        self.create(ToastVariant::Info, options)
    }

    /// Error toast for a structured application error
    pub fn report(&self, error: &AppError) -> ToastId {
        self.error(ToastOptions::from(error))
    }

    /// Remove a toast now; unknown ids are ignored
    pub fn dismiss(&self, id: ToastId) {
        self.lock().dismiss(id);
    }

    /// Remove every toast and forget every fingerprint
    pub fn dismiss_all(&self) {
        self.lock().dismiss_all();
    }

    /// Synchronously clear toasts, dedup index, timers and the id sequence
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Fire due deadlines
    pub fn tick(&self) -> Vec<ToastId> {
        self.lock().tick()
    }

    /// Delay until the earliest pending deadline
    pub fn time_until_next_timer(&self) -> Option<Duration> {
        self.lock().time_until_next_timer()
    }

    /// Subscribe to change notifications; drain it regularly or drop it
    pub fn subscribe(&self) -> StoreSubscription {
        self.lock().subscribe()
    }

    /// Replace the configuration for later operations
    pub fn apply_config(&self, config: ToastConfig) {
        self.lock().apply_config(config);
    }

    /// Copy of the active configuration
    pub fn config(&self) -> ToastConfig {
        self.lock().config().clone()
    }

    /// Number of active toasts
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no toast is active
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of one toast
    pub fn get(&self, id: ToastId) -> Option<ToastRecord> {
        self.lock().get(id).cloned()
    }

    /// Copy of every active toast, oldest first
    pub fn snapshot(&self) -> Vec<ToastRecord> {
        self.lock().records().cloned().collect()
    }

    /// Copy of the oldest `limit` toasts
    pub fn visible(&self, limit: usize) -> Vec<ToastRecord> {
        self.lock().visible(limit)
    }

    /// Whether a toast has a pending auto-dismiss
    pub fn has_timer(&self, id: ToastId) -> bool {
        self.lock().has_timer(id)
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}

impl std::fmt::Debug for Toaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toaster").field("active", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_clones_share_store() {
        let toaster = Toaster::default();
        let other = toaster.clone();
        let id = toaster.info("hello");
        assert_eq!(other.len(), 1);
        other.dismiss(id);
        assert!(toaster.is_empty());
    }

    #[test]
    fn test_tick_through_handle() {
        let clock = Arc::new(ManualClock::new());
        let toaster = Toaster::with_clock(ToastConfig::default(), clock.clone());
        toaster.success("Saved");
        toaster.error("Failed");
        clock.advance_ms(3000);
        assert_eq!(toaster.tick().len(), 1);
        assert_eq!(toaster.snapshot()[0].variant, ToastVariant::Error);
    }

    #[test]
    fn test_report_uses_correlation_id() {
        let toaster = Toaster::default();
        let error = AppError::new("req-7", "HTTP_REQUEST_FAILED", "Request failed");
        let id = toaster.report(&error);
        let record = toaster.get(id).unwrap();
        assert_eq!(record.variant, ToastVariant::Error);
        assert_eq!(record.message, "Request failed");
        assert_eq!(record.correlation_id.as_deref(), Some("req-7"));
    }

    #[test]
    fn test_apply_config() {
        let toaster = Toaster::default();
        let config = ToastConfig {
            max_visible: 5,
            ..ToastConfig::default()
        };
        toaster.apply_config(config.clone());
        assert_eq!(toaster.config(), config);
    }

    #[test]
    fn test_global_is_shared() {
        let a = Toaster::global() as *const Toaster;
        let b = Toaster::global() as *const Toaster;
        assert_eq!(a, b);
    }
}
