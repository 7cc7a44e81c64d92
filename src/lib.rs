//! Toast Center Library
//!
//! Transient, deduplicated user notifications. Toasts are raised through a
//! [`Toaster`] handle or published on an [`EventBus`]; repeats within a
//! sliding window fold into one record with an occurrence count, and timed
//! toasts expire on their own while errors stay until dismissed.
//!
//! The [`view`] module turns the active set into what a toast stack and a
//! badge draw.

#![warn(missing_docs)]

pub mod bus;
pub mod clock;
/// Configuration file and toast settings
pub mod config;
/// Config file hot-reload
pub mod config_watcher;
/// Error types
pub mod error;
pub mod logging;
/// Structured application errors
pub mod report;
pub mod runtime;
pub mod theme;
pub mod toast;
pub mod view;

// Re-export commonly used types
pub use bus::{
    emit_toast, setup_global_bridge, teardown_global_bridge, BridgeHandle, ConsoleRequestedPayload,
    EventBridge, EventBus, LocalBus, ShowToastPayload, SubscriptionId, CONSOLE_REQUESTED,
    TOAST_SHOW,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ToastConfig};
pub use config_watcher::{ConfigReloadEvent, ConfigWatcher};
pub use error::{BridgeError, ClipboardError, ConfigError};
pub use report::AppError;
pub use runtime::register_expiry_timer;
pub use theme::{Color, Theme};
pub use toast::{
    RemovalReason, StoreChange, StoreSubscription, ToastDuration, ToastId, ToastOptions,
    ToastRecord, ToastStore, ToastVariant, Toaster,
};
pub use view::{
    Clipboard, MemoryClipboard, NotificationBadge, RenderedToast, SystemClipboard, ToastAction,
    ToastView,
};
