//! Toast view model
//!
//! [`ToastView`] turns the store's active set into what a toast stack shows:
//! the oldest few records, each with its message, an occurrence badge and the
//! actions it offers. It never hides anything locally. A toast disappears
//! from the view only because the store removed it.

pub mod badge;
pub mod clipboard;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::{ConsoleRequestedPayload, EventBus, CONSOLE_REQUESTED};
use crate::theme::{Color, Theme};
use crate::toast::{StoreSubscription, ToastId, ToastRecord, ToastVariant, Toaster};

pub use badge::{format_badge_count, NotificationBadge, BADGE_CAP};
pub use clipboard::{Clipboard, ClipboardFuture, MemoryClipboard, SystemClipboard};

/// Font weight of a text segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Normal text
    Regular,
    /// Emphasized text
    Bold,
}

/// A styled text segment with optional weight and color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    /// The text content
    pub text: String,
    /// Font weight for this segment
    pub weight: FontWeight,
    /// Optional custom color. If None, uses theme default.
    pub color: Option<Color>,
}

impl TextSegment {
    /// Create a regular weight text segment
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Regular,
            color: None,
        }
    }

    /// Create a text segment with custom color
    pub fn with_color(text: impl Into<String>, weight: FontWeight, color: Color) -> Self {
        Self {
            text: text.into(),
            weight,
            color: Some(color),
        }
    }
}

/// Gestures a rendered toast offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastAction {
    /// Open the console panel at the toast's correlation id
    ViewConsole,
    /// Put message and details on the clipboard
    CopyDetails,
    /// Remove the toast
    Dismiss,
}

/// One toast as the stack draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedToast {
    /// Store identifier
    pub id: ToastId,
    /// Severity
    pub variant: ToastVariant,
    /// Variant icon
    pub icon: &'static str,
    /// Display text without the badge
    pub message: String,
    /// `(×N)` when the toast fired more than once
    pub count_badge: Option<String>,
    /// Message and badge as styled segments
    pub segments: Vec<TextSegment>,
    /// Variant accent, also used for the badge segment
    pub accent: Color,
    /// Toast background
    pub background: Color,
    /// Default color of segments without their own
    pub foreground: Color,
    /// Gestures offered, in display order
    pub actions: Vec<ToastAction>,
    /// Caller supplied id, or `toast-{variant}`
    pub test_id: String,
    /// Local creation time, `HH:MM:SS`
    pub timestamp: String,
}

impl RenderedToast {
    fn from_record(record: &ToastRecord, theme: &Theme) -> Self {
        let accent = theme.variant_color(record.variant);
        let count_badge = record.is_repeated().then(|| format_count_badge(record.count));

        let mut segments = vec![TextSegment::regular(record.message.clone())];
        if let Some(badge) = &count_badge {
            segments.push(TextSegment::with_color(
                format!(" {}", badge),
                FontWeight::Bold,
                accent,
            ));
        }

        Self {
            id: record.id,
            variant: record.variant,
            icon: record.variant.icon(),
            message: record.message.clone(),
            count_badge,
            segments,
            accent,
            background: theme.background,
            foreground: theme.text_primary,
            actions: actions_for(record),
            test_id: record
                .test_id
                .clone()
                .unwrap_or_else(|| format!("toast-{}", record.variant)),
            timestamp: record.created_wall.format("%H:%M:%S").to_string(),
        }
    }

    /// Plain text as displayed: `"Saved"` or `"Saved (×3)"`
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Whether the toast offers a gesture
    pub fn has_action(&self, action: ToastAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Occurrence badge text
pub fn format_count_badge(count: u32) -> String {
    format!("(×{})", count)
}

fn actions_for(record: &ToastRecord) -> Vec<ToastAction> {
    match record.variant {
        ToastVariant::Error => vec![
            ToastAction::ViewConsole,
            ToastAction::CopyDetails,
            ToastAction::Dismiss,
        ],
        _ if record.details.is_some() => vec![ToastAction::CopyDetails, ToastAction::Dismiss],
        _ => vec![ToastAction::Dismiss],
    }
}

/// Text placed on the clipboard for a toast
pub fn clipboard_text(record: &ToastRecord) -> String {
    match &record.details {
        Some(details) => format!("{}\n{}", record.message, details),
        None => record.message.clone(),
    }
}

/// Bounded, ordered view over the active toasts
pub struct ToastView {
    toaster: Toaster,
    subscription: StoreSubscription,
    max_visible: usize,
    theme: Theme,
    bus: Option<Arc<dyn EventBus>>,
    clipboard: Arc<dyn Clipboard>,
    rendered: Vec<RenderedToast>,
    hidden: usize,
    render_count: u64,
}

impl ToastView {
    /// Mount a view over a toaster and render the current state
    pub fn new(toaster: Toaster) -> Self {
        let max_visible = toaster.config().max_visible;
        let subscription = toaster.subscribe();
        let mut view = Self {
            toaster,
            subscription,
            max_visible,
            theme: Theme::default(),
            bus: None,
            clipboard: Arc::new(SystemClipboard),
            rendered: Vec::new(),
            hidden: 0,
            render_count: 0,
        };
        view.render();
        view
    }

    /// Use a theme for accents
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self.render();
        self
    }

    /// Bus used by the view-console action
    pub fn with_bus(mut self, bus: Arc<dyn EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Clipboard used by the copy action
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Change how many toasts are shown at once
    pub fn set_max_visible(&mut self, max_visible: usize) {
        self.max_visible = max_visible.max(1);
        self.render();
    }

    /// Toasts shown at once
    pub fn max_visible(&self) -> usize {
        self.max_visible
    }

    /// Apply pending store changes; returns whether the view re-rendered
    ///
    /// Changes queue up until this is called, so the host should call it
    /// after every loop iteration that may have touched the store.
    pub fn sync(&mut self) -> bool {
        let changes = self.subscription.drain();
        if changes.is_empty() {
            return false;
        }
        debug!(changes = changes.len(), "Toast view re-rendering");
        self.render();
        true
    }

    fn render(&mut self) {
        let total = self.toaster.len();
        self.rendered = self
            .toaster
            .visible(self.max_visible)
            .iter()
            .map(|record| RenderedToast::from_record(record, &self.theme))
            .collect();
        self.hidden = total.saturating_sub(self.rendered.len());
        self.render_count += 1;
    }

    /// Toasts currently on screen, oldest first
    pub fn visible(&self) -> &[RenderedToast] {
        &self.rendered
    }

    /// Active toasts waiting for a free slot
    pub fn hidden_count(&self) -> usize {
        self.hidden
    }

    /// How many times the view has rendered
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Find a rendered toast
    pub fn find(&self, id: ToastId) -> Option<&RenderedToast> {
        self.rendered.iter().find(|t| t.id == id)
    }

    /// Dismiss control
    pub fn dismiss(&self, id: ToastId) {
        self.toaster.dismiss(id);
    }

    /// Clear every toast
    pub fn dismiss_all(&self) {
        self.toaster.dismiss_all();
    }

    /// Ask the console panel to open at this toast's correlation id
    ///
    /// Returns whether an event was published.
    pub fn view_console(&self, id: ToastId) -> bool {
        let Some(record) = self.toaster.get(id) else {
            return false;
        };
        let Some(bus) = &self.bus else {
            warn!(id = %id, "No event bus attached, cannot open console");
            return false;
        };

        let payload = ConsoleRequestedPayload {
            correlation_id: record.correlation_id,
        };
        match serde_json::to_value(&payload) {
            Ok(value) => {
                bus.publish(CONSOLE_REQUESTED, value);
                debug!(id = %id, correlation_id = ?payload.correlation_id, "Console requested");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to encode console request");
                false
            }
        }
    }

    /// Copy message and details to the clipboard
    ///
    /// Failures are logged and swallowed; they never raise another toast.
    /// Returns whether the copy succeeded.
    pub async fn copy_details(&self, id: ToastId) -> bool {
        let Some(record) = self.toaster.get(id) else {
            return false;
        };
        let text = clipboard_text(&record);

        match self.clipboard.write_text(&text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to copy toast to clipboard");
                false
            }
        }
    }

    /// Dispatch a non-async action
    ///
    /// `CopyDetails` needs [`copy_details`](Self::copy_details) and is ignored
    /// here.
    pub fn trigger(&self, id: ToastId, action: ToastAction) {
        match action {
            ToastAction::Dismiss => self.dismiss(id),
            ToastAction::ViewConsole => {
                self.view_console(id);
            }
            ToastAction::CopyDetails => {
                debug!(id = %id, "Copy action must be awaited via copy_details");
            }
        }
    }
}
