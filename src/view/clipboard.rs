//! Clipboard port for the copy action
//!
//! Writing to the clipboard is the one asynchronous user action. Callers get
//! a [`ClipboardResult`] back, but the toast view only ever logs failures.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{ClipboardError, ClipboardResult};

/// Boxed future returned by [`Clipboard::write_text`]
pub type ClipboardFuture<'a> = Pin<Box<dyn Future<Output = ClipboardResult<()>> + Send + 'a>>;

/// Somewhere copied text can go
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents
    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a>;
}

/// The desktop clipboard, through `arboard`
///
/// `arboard` blocks while it talks to the display server, so each write runs
/// on tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    fn set_text_blocking(text: String) -> ClipboardResult<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}

impl Clipboard for SystemClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a> {
        let text = text.to_string();
        Box::pin(async move {
            let bytes = text.len();
            tokio::task::spawn_blocking(move || Self::set_text_blocking(text)).await??;
            debug!(bytes, "Copied to clipboard");
            Ok(())
        })
    }
}

/// In-process clipboard, optionally failing every write
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    fail: bool,
}

impl MemoryClipboard {
    /// An empty clipboard that accepts writes
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail
    pub fn failing() -> Self {
        Self {
            contents: Mutex::new(None),
            fail: true,
        }
    }

    /// Last written text
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> ClipboardFuture<'a> {
        Box::pin(async move {
            if self.fail {
                return Err(ClipboardError::Unavailable(
                    "memory clipboard configured to fail".to_string(),
                ));
            }
            *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.write_text("hello").await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_failing_clipboard() {
        let clipboard = MemoryClipboard::failing();
        let result = clipboard.write_text("hello").await;
        assert!(matches!(result, Err(ClipboardError::Unavailable(_))));
        assert!(clipboard.contents().is_none());
    }

    #[test]
    fn test_backend_errors_convert() {
        let error = ClipboardError::from(arboard::Error::ClipboardNotSupported);
        assert!(matches!(error, ClipboardError::Access(_)));
        assert!(error.to_string().starts_with("Clipboard access failed"));
    }

    // Headless runners have no display server; a write there must surface as
    // an error rather than a panic.
    #[tokio::test]
    async fn test_system_clipboard_never_panics() {
        let clipboard = SystemClipboard;
        if let Err(e) = clipboard.write_text("hello").await {
            assert!(matches!(e, ClipboardError::Access(_)));
        }
    }
}
