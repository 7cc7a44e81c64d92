//! Event bus interface
//!
//! The toast center does not own the application's pub/sub bus; it consumes
//! one through [`EventBus`]. [`LocalBus`] is the in-process implementation used
//! by the binary and the tests.
//!
//! Payloads travel as JSON values so the same topics can be fed from another
//! process.

pub mod bridge;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{BridgeError, BridgeResult};
use crate::toast::{ToastDuration, ToastOptions, ToastVariant};

pub use bridge::{setup_global_bridge, teardown_global_bridge, BridgeHandle, EventBridge};

/// Topic carrying toast requests
pub const TOAST_SHOW: &str = "toast.show";
/// Topic asking the console panel to open
pub const CONSOLE_REQUESTED: &str = "panel.console-requested";

/// Callback invoked for every event on a topic
pub type EventHandler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Wrap a closure as an [`EventHandler`]
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&serde_json::Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identifies one subscription on a bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Publish/subscribe transport
pub trait EventBus: Send + Sync {
    /// Register a handler for a topic
    fn subscribe(&self, topic: &str, handler: EventHandler) -> SubscriptionId;

    /// Remove a handler; returns whether it was registered
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Deliver a payload to every handler of a topic, returning how many ran
    fn publish(&self, topic: &str, payload: serde_json::Value) -> usize;
}

/// In-process bus delivering synchronously on the publishing thread
#[derive(Default)]
pub struct LocalBus {
    handlers: Mutex<HashMap<String, Vec<(SubscriptionId, EventHandler)>>>,
    next_id: AtomicU64,
}

impl LocalBus {
    /// A bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus
    pub fn global() -> Arc<LocalBus> {
        static GLOBAL: OnceLock<Arc<LocalBus>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(LocalBus::new())).clone()
    }

    /// Number of handlers on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl EventBus for LocalBus {
    fn subscribe(&self, topic: &str, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(topic.to_string())
            .or_default()
            .push((id, handler));
        trace!(topic, id = id.0, "Bus subscription added");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        let mut removed = false;
        for list in handlers.values_mut() {
            let before = list.len();
            list.retain(|(sub, _)| *sub != id);
            removed |= list.len() != before;
        }
        handlers.retain(|_, list| !list.is_empty());
        removed
    }

    fn publish(&self, topic: &str, payload: serde_json::Value) -> usize {
        // Handlers run without the lock held so they may publish or unsubscribe
        let targets: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(topic)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        trace!(topic, handlers = targets.len(), "Publishing event");
        for handler in &targets {
            handler(&payload);
        }
        targets.len()
    }
}

/// Payload of [`TOAST_SHOW`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowToastPayload {
    /// Variant
    #[serde(rename = "type")]
    pub variant: ToastVariant,
    /// Display text
    pub message: String,
    /// Secondary text for the copy action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Cross-reference into external logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Auto-dismiss override in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Caller supplied test identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
}

impl ShowToastPayload {
    /// Decode a bus payload
    pub fn from_value(value: &serde_json::Value) -> BridgeResult<Self> {
        let payload = Self::deserialize(value)?;
        if payload.message.trim().is_empty() {
            return Err(BridgeError::EmptyMessage);
        }
        Ok(payload)
    }

    /// Build a payload from the imperative API's arguments
    pub fn new(variant: ToastVariant, options: ToastOptions) -> Self {
        Self {
            variant,
            message: options.message,
            details: options.details,
            correlation_id: options.correlation_id,
            duration: options.duration.and_then(|d| d.as_millis()),
            test_id: options.test_id,
        }
    }

    /// Split into the store's create arguments
    pub fn into_parts(self) -> (ToastVariant, ToastOptions) {
        let options = ToastOptions {
            message: self.message,
            details: self.details,
            correlation_id: self.correlation_id,
            duration: self.duration.map(ToastDuration::from_millis),
            test_id: self.test_id,
        };
        (self.variant, options)
    }
}

/// Payload of [`CONSOLE_REQUESTED`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleRequestedPayload {
    /// Log entry to focus, if the toast had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Raise a toast through a bus instead of a direct store reference
pub fn emit_toast(bus: &dyn EventBus, variant: ToastVariant, options: impl Into<ToastOptions>) -> usize {
    let payload = ShowToastPayload::new(variant, options.into());
    match serde_json::to_value(&payload) {
        Ok(value) => bus.publish(TOAST_SHOW, value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode toast payload");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_reaches_topic_subscribers() {
        let bus = LocalBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.subscribe(
            "a",
            handler(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(bus.publish("a", json!({})), 1);
        assert_eq!(bus.publish("b", json!({})), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = LocalBus::new();
        let id = bus.subscribe("a", handler(|_| {}));
        assert_eq!(bus.subscriber_count("a"), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count("a"), 0);
        assert_eq!(bus.publish("a", json!({})), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = Arc::new(LocalBus::new());
        let inner = bus.clone();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        bus.subscribe(
            "outer",
            handler(move |_| {
                inner.publish("inner", json!(null));
            }),
        );
        bus.subscribe(
            "inner",
            handler(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        bus.publish("outer", json!(null));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_show_payload_decoding() {
        let value = json!({
            "type": "error",
            "message": "X",
            "details": "stack",
            "correlationId": "a",
            "duration": 1500,
            "testId": "t"
        });
        let payload = ShowToastPayload::from_value(&value).unwrap();
        let (variant, options) = payload.into_parts();
        assert_eq!(variant, ToastVariant::Error);
        assert_eq!(options.message, "X");
        assert_eq!(options.details.as_deref(), Some("stack"));
        assert_eq!(options.correlation_id.as_deref(), Some("a"));
        assert_eq!(options.duration, Some(ToastDuration::from_millis(1500)));
        assert_eq!(options.test_id.as_deref(), Some("t"));
    }

    #[test]
    fn test_show_payload_rejects_bad_input() {
        assert!(matches!(
            ShowToastPayload::from_value(&json!({"type": "fatal", "message": "x"})),
            Err(BridgeError::InvalidPayload(_))
        ));
        assert!(matches!(
            ShowToastPayload::from_value(&json!({"type": "info"})),
            Err(BridgeError::InvalidPayload(_))
        ));
        assert!(matches!(
            ShowToastPayload::from_value(&json!({"type": "info", "message": " "})),
            Err(BridgeError::EmptyMessage)
        ));
    }

    #[test]
    fn test_emit_toast_encodes_camel_case() {
        let bus = LocalBus::new();
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        bus.subscribe(
            TOAST_SHOW,
            handler(move |value| {
                *slot.lock().unwrap() = Some(value.clone());
            }),
        );

        emit_toast(
            &bus,
            ToastVariant::Warning,
            ToastOptions::new("Careful").correlation_id("c-1"),
        );
        let value = seen.lock().unwrap().clone().unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["correlationId"], "c-1");
        assert!(value.get("details").is_none());
    }
}
