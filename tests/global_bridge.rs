//! Process-wide bridge tests
//!
//! The global bus and toaster are shared by every test in a binary, so this
//! file holds a single test that owns them.

use toast_center::{
    emit_toast, setup_global_bridge, teardown_global_bridge, LocalBus, ToastVariant,
    Toaster, TOAST_SHOW,
};

#[test]
fn test_global_bridge_lifecycle() {
    let bus = LocalBus::global();
    let toaster = Toaster::global();
    toaster.reset();

    // Setting up twice keeps one subscription
    let first = setup_global_bridge();
    let second = setup_global_bridge();
    assert_eq!(first.subscription(), second.subscription());
    assert_eq!(bus.subscriber_count(TOAST_SHOW), 1);

    emit_toast(bus.as_ref(), ToastVariant::Success, "Saved");
    let records = toaster.snapshot();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "Saved");
    assert_eq!(records[0].count, 1);

    teardown_global_bridge();
    assert_eq!(bus.subscriber_count(TOAST_SHOW), 0);
    emit_toast(bus.as_ref(), ToastVariant::Info, "Dropped");
    assert_eq!(toaster.len(), 1);

    // Re-arming after teardown subscribes again
    let rearmed = setup_global_bridge();
    assert_eq!(bus.subscriber_count(TOAST_SHOW), 1);
    emit_toast(bus.as_ref(), ToastVariant::Success, "Saved");
    assert_eq!(toaster.len(), 1);
    assert_eq!(toaster.snapshot()[0].count, 2);

    rearmed.teardown();
    assert_eq!(bus.subscriber_count(TOAST_SHOW), 0);
    toaster.reset();
    assert!(toaster.is_empty());
}
