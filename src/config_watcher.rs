// Configuration file watcher with hot-reload of toast settings

use anyhow::{Context, Result};
use notify::{
    event::{EventKind, ModifyKind},
    Config as NotifyConfig, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::config::Config;

/// Rapid successive writes within this window count as one change
pub const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Configuration reload event
#[derive(Debug, Clone)]
pub struct ConfigReloadEvent {
    /// Timestamp when the event was generated
    pub timestamp: Instant,
}

/// Configuration file watcher
///
/// Monitors the config file and sends debounced reload events through a
/// channel. [`poll_reload`](Self::poll_reload) turns pending events into a
/// freshly loaded [`Config`].
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<ConfigReloadEvent>,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Watch a configuration file
    pub fn new(config_path: PathBuf) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut last_event: Option<Instant> = None;

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => match event.kind {
                    EventKind::Modify(ModifyKind::Data(_))
                    | EventKind::Modify(ModifyKind::Any)
                    | EventKind::Create(_) => {
                        let now = Instant::now();
                        if let Some(last) = last_event {
                            if now.duration_since(last) < DEBOUNCE_DURATION {
                                tracing::trace!("Config change debounced");
                                return;
                            }
                        }
                        last_event = Some(now);

                        tracing::info!("Config file changed, triggering reload");
                        if let Err(e) = tx.send(ConfigReloadEvent { timestamp: now }) {
                            tracing::error!(error = %e, "Failed to send config reload event");
                        }
                    }
                    _ => {
                        tracing::trace!(kind = ?event.kind, "Ignoring file event");
                    }
                },
                Err(e) => {
                    tracing::error!(error = %e, "File watcher error");
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&config_path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path.display()))?;

        tracing::info!(path = %config_path.display(), "Config file watcher initialized");

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path: config_path,
        })
    }

    /// Watched path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the file if it changed since the last poll
    ///
    /// All pending events collapse into one reload. A file that fails to
    /// parse or validate is logged and skipped, keeping the running settings.
    pub fn poll_reload(&self) -> Option<Config> {
        if self.receiver.try_iter().count() == 0 {
            return None;
        }

        match Config::load_from(&self.path) {
            Ok(config) => {
                tracing::info!(path = %self.path.display(), "Configuration reloaded");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid configuration change");
                None
            }
        }
    }
}
