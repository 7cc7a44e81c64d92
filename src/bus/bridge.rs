//! Event bridge from the bus into the toast store
//!
//! One long-lived subscription on [`TOAST_SHOW`] turns published payloads into
//! toaster calls. Setup is idempotent and teardown re-arms it, which keeps
//! tests isolated while production code sets it up once at startup, before
//! any view exists, so early errors are not lost.

use std::sync::{Arc, Mutex, OnceLock};

use tracing::{debug, info, warn};

use super::{handler, EventBus, LocalBus, ShowToastPayload, SubscriptionId, TOAST_SHOW};
use crate::toast::Toaster;

struct BridgeInner {
    bus: Arc<dyn EventBus>,
    toaster: Toaster,
    /// Set while subscribed
    subscription: Mutex<Option<SubscriptionId>>,
}

/// Bus -> toaster bridge
#[derive(Clone)]
pub struct EventBridge {
    inner: Arc<BridgeInner>,
}

/// Teardown handle returned by [`EventBridge::setup`]
#[derive(Clone)]
pub struct BridgeHandle {
    bridge: EventBridge,
    subscription: SubscriptionId,
}

impl BridgeHandle {
    /// Subscription this handle refers to
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Unsubscribe the bridge
    pub fn teardown(self) {
        self.bridge.teardown();
    }
}

impl EventBridge {
    /// Bridge a bus into a toaster; nothing is subscribed until [`setup`](Self::setup)
    pub fn new(bus: Arc<dyn EventBus>, toaster: Toaster) -> Self {
        Self {
            inner: Arc::new(BridgeInner {
                bus,
                toaster,
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to the show topic, once
    ///
    /// Calling this while already subscribed returns a handle over the
    /// existing subscription.
    pub fn setup(&self) -> BridgeHandle {
        let mut guard = self
            .inner
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = *guard {
            debug!(subscription = existing.0, "Toast bridge already set up");
            return BridgeHandle {
                bridge: self.clone(),
                subscription: existing,
            };
        }

        let toaster = self.inner.toaster.clone();
        let subscription = self.inner.bus.subscribe(
            TOAST_SHOW,
            handler(move |value| match ShowToastPayload::from_value(value) {
                Ok(payload) => {
                    let (variant, options) = payload.into_parts();
                    let id = toaster.create(variant, options);
                    debug!(id = %id, variant = %variant, "Toast raised from bus");
                }
                Err(e) => {
                    warn!(error = %e, payload = %value, "Dropping malformed toast event");
                }
            }),
        );
        *guard = Some(subscription);

        info!(topic = TOAST_SHOW, subscription = subscription.0, "Toast bridge set up");

        BridgeHandle {
            bridge: self.clone(),
            subscription,
        }
    }

    /// Unsubscribe and clear state so a later setup subscribes again
    pub fn teardown(&self) {
        let mut guard = self
            .inner
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        if let Some(subscription) = guard.take() {
            self.inner.bus.unsubscribe(subscription);
            info!(subscription = subscription.0, "Toast bridge torn down");
        }
    }

    /// Whether the bridge is subscribed
    pub fn is_active(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

fn global_bridge() -> &'static EventBridge {
    static GLOBAL: OnceLock<EventBridge> = OnceLock::new();
    GLOBAL.get_or_init(|| EventBridge::new(LocalBus::global(), Toaster::global().clone()))
}

/// Bridge the global bus into the global toaster
pub fn setup_global_bridge() -> BridgeHandle {
    global_bridge().setup()
}

/// Tear down the global bridge
pub fn teardown_global_bridge() {
    global_bridge().teardown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::emit_toast;
    use crate::toast::{ToastOptions, ToastVariant};
    use serde_json::json;

    fn bridge() -> (Arc<LocalBus>, Toaster, EventBridge) {
        let bus = Arc::new(LocalBus::new());
        let toaster = Toaster::default();
        let bridge = EventBridge::new(bus.clone(), toaster.clone());
        (bus, toaster, bridge)
    }

    #[test]
    fn test_events_create_toasts() {
        let (bus, toaster, bridge) = bridge();
        bridge.setup();

        bus.publish(TOAST_SHOW, json!({"type": "success", "message": "Saved"}));
        let records = toaster.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].variant, ToastVariant::Success);
        assert_eq!(records[0].message, "Saved");
    }

    #[test]
    fn test_setup_is_idempotent() {
        let (bus, toaster, bridge) = bridge();
        let first = bridge.setup();
        let second = bridge.setup();
        assert_eq!(first.subscription(), second.subscription());
        assert_eq!(bus.subscriber_count(TOAST_SHOW), 1);

        emit_toast(bus.as_ref(), ToastVariant::Info, "once");
        assert_eq!(toaster.snapshot()[0].count, 1);
    }

    #[test]
    fn test_teardown_and_rearm() {
        let (bus, toaster, bridge) = bridge();
        let handle = bridge.setup();
        handle.teardown();
        assert!(!bridge.is_active());
        assert_eq!(bus.subscriber_count(TOAST_SHOW), 0);

        emit_toast(bus.as_ref(), ToastVariant::Info, "ignored");
        assert!(toaster.is_empty());

        bridge.setup();
        assert!(bridge.is_active());
        emit_toast(
            bus.as_ref(),
            ToastVariant::Warning,
            ToastOptions::new("back"),
        );
        assert_eq!(toaster.len(), 1);

        // Second teardown is harmless
        bridge.teardown();
        bridge.teardown();
        assert_eq!(bus.subscriber_count(TOAST_SHOW), 0);
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let (bus, toaster, bridge) = bridge();
        bridge.setup();
        bus.publish(TOAST_SHOW, json!({"type": "nope", "message": "x"}));
        bus.publish(TOAST_SHOW, json!("just a string"));
        assert!(toaster.is_empty());
    }
}
