//! Notification badge
//!
//! A small counter of active toasts. It only re-renders when the number of
//! toasts changes; a repeat of an existing toast leaves it untouched.

use tracing::trace;

use crate::toast::{StoreSubscription, Toaster};

/// Largest count shown as a number
pub const BADGE_CAP: usize = 99;

/// Badge text for a count: `None` when zero, `"99+"` above the cap
pub fn format_badge_count(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > BADGE_CAP => Some(format!("{}+", BADGE_CAP)),
        n => Some(n.to_string()),
    }
}

/// Active toast counter
pub struct NotificationBadge {
    toaster: Toaster,
    subscription: StoreSubscription,
    count: usize,
    render_count: u64,
}

impl NotificationBadge {
    /// Mount a badge over a toaster
    pub fn new(toaster: Toaster) -> Self {
        let subscription = toaster.subscribe();
        let count = toaster.len();
        Self {
            toaster,
            subscription,
            count,
            render_count: 1,
        }
    }

    /// Apply pending store changes; returns whether the badge re-rendered
    ///
    /// Changes queue up until this is called.
    pub fn sync(&mut self) -> bool {
        let resized = self
            .subscription
            .drain()
            .iter()
            .any(|change| change.affects_size());
        if !resized {
            return false;
        }

        let count = self.toaster.len();
        trace!(from = self.count, to = count, "Badge count changed");
        self.count = count;
        self.render_count += 1;
        true
    }

    /// Active toasts as of the last sync
    pub fn count(&self) -> usize {
        self.count
    }

    /// Text to draw, if any
    pub fn label(&self) -> Option<String> {
        format_badge_count(self.count)
    }

    /// How many times the badge has rendered
    pub fn render_count(&self) -> u64 {
        self.render_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_badge_count() {
        assert_eq!(format_badge_count(0), None);
        assert_eq!(format_badge_count(1).as_deref(), Some("1"));
        assert_eq!(format_badge_count(99).as_deref(), Some("99"));
        assert_eq!(format_badge_count(100).as_deref(), Some("99+"));
    }

    #[test]
    fn test_tracks_store_size() {
        let toaster = Toaster::default();
        let mut badge = NotificationBadge::new(toaster.clone());
        assert_eq!(badge.label(), None);

        let id = toaster.info("a");
        toaster.info("b");
        assert!(badge.sync());
        assert_eq!(badge.count(), 2);
        assert_eq!(badge.label().as_deref(), Some("2"));

        toaster.dismiss(id);
        assert!(badge.sync());
        assert_eq!(badge.count(), 1);
    }

    #[test]
    fn test_repeat_does_not_rerender() {
        let toaster = Toaster::default();
        toaster.success("Saved");
        let mut badge = NotificationBadge::new(toaster.clone());
        let renders = badge.render_count();

        toaster.success("Saved");
        toaster.success("Saved");
        assert!(!badge.sync());
        assert_eq!(badge.render_count(), renders);
        assert_eq!(badge.count(), 1);
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let toaster = Toaster::default();
        let mut badge = NotificationBadge::new(toaster.clone());
        for i in 0..120 {
            toaster.warning(format!("w{}", i));
        }
        badge.sync();
        assert_eq!(badge.label().as_deref(), Some("99+"));

        toaster.dismiss_all();
        assert!(badge.sync());
        assert_eq!(badge.label(), None);
    }
}
