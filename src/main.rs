// Toast Center - stdin-driven toast stack
// Reads toast.show payloads and commands, prints the stack after each change

use anyhow::{Context, Result};
use calloop::channel::{channel, Event};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use toast_center::{
    bus::handler,
    config::Config,
    config_watcher::ConfigWatcher,
    logging, runtime,
    theme::Theme,
    toast::{ToastId, Toaster},
    view::{NotificationBadge, ToastView},
    ConsoleRequestedPayload, EventBus, LocalBus, SystemClipboard, CONSOLE_REQUESTED, TOAST_SHOW,
};

/// One line of input
#[derive(Debug, Clone, PartialEq)]
enum Command {
    /// A `toast.show` payload to publish
    Show(serde_json::Value),
    Dismiss(ToastId),
    Clear,
    Copy(ToastId),
    Console(ToastId),
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        let value = serde_json::from_str(line).context("Invalid JSON payload")?;
        return Ok(Some(Command::Show(value)));
    }

    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let id = |arg: Option<&str>| -> Result<ToastId> {
        let arg = arg.with_context(|| format!("'{}' needs a toast id", verb))?;
        arg.parse::<ToastId>()
            .map_err(|e| anyhow::anyhow!("Invalid toast id '{}': {}", arg, e))
    };

    let command = match verb {
        "dismiss" => Command::Dismiss(id(parts.next())?),
        "copy" => Command::Copy(id(parts.next())?),
        "console" => Command::Console(id(parts.next())?),
        "clear" => Command::Clear,
        "quit" | "exit" => Command::Quit,
        other => anyhow::bail!("Unknown command: {}", other),
    };
    Ok(Some(command))
}

/// Main application state
struct ToastCenter {
    bus: Arc<LocalBus>,
    toaster: Toaster,
    view: ToastView,
    badge: NotificationBadge,
    config_watcher: Option<ConfigWatcher>,
    // Clipboard futures run here
    async_runtime: tokio::runtime::Runtime,
    running: bool,
}

impl ToastCenter {
    fn handle(&mut self, command: Command) {
        match command {
            Command::Show(payload) => {
                self.bus.publish(TOAST_SHOW, payload);
            }
            Command::Dismiss(id) => self.view.dismiss(id),
            Command::Clear => self.view.dismiss_all(),
            Command::Copy(id) => {
                if self.async_runtime.block_on(self.view.copy_details(id)) {
                    println!("copied {}", id);
                }
            }
            Command::Console(id) => {
                self.view.view_console(id);
            }
            Command::Quit => self.running = false,
        }
    }

    fn reload_config(&mut self) {
        let Some(config) = self.config_watcher.as_ref().and_then(|w| w.poll_reload()) else {
            return;
        };
        self.view.set_max_visible(config.toast.max_visible);
        self.toaster.apply_config(config.toast);
    }

    fn print(&self) {
        let badge = self.badge.label().unwrap_or_else(|| "-".to_string());
        println!("[{}] {} active", badge, self.badge.count());
        for toast in self.view.visible() {
            println!(
                "  {} {} {} {}",
                toast.timestamp,
                toast.id,
                toast.icon,
                toast.text()
            );
        }
        if self.view.hidden_count() > 0 {
            println!("  +{} more", self.view.hidden_count());
        }
    }
}

fn main() -> Result<()> {
    logging::init();

    tracing::info!("Starting Toast Center");

    let config = Config::load()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let toaster = Toaster::global().clone();
    toaster.apply_config(config.toast.clone());

    // Subscribe before anything can publish so early events are kept
    let bus = LocalBus::global();
    let _bridge = toast_center::setup_global_bridge();

    bus.subscribe(
        CONSOLE_REQUESTED,
        handler(|value| {
            let payload: ConsoleRequestedPayload =
                serde_json::from_value(value.clone()).unwrap_or_default();
            println!(
                "console requested: {}",
                payload.correlation_id.as_deref().unwrap_or("<none>")
            );
        }),
    );

    let view = ToastView::new(toaster.clone())
        .with_theme(Theme::from_name(&config.theme))
        .with_bus(bus.clone())
        .with_clipboard(Arc::new(SystemClipboard));
    let badge = NotificationBadge::new(toaster.clone());

    let config_watcher = match Config::config_path() {
        Ok(path) => match ConfigWatcher::new(path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot-reload disabled");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Config hot-reload disabled");
            None
        }
    };

    let async_runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    let mut app = ToastCenter {
        bus: bus.clone(),
        toaster: toaster.clone(),
        view,
        badge,
        config_watcher,
        async_runtime,
        running: true,
    };

    let mut event_loop =
        calloop::EventLoop::<ToastCenter>::try_new().context("Failed to create event loop")?;

    runtime::register_expiry_timer(&event_loop.handle(), toaster)?;

    // Stdin is read on its own thread and fed into the loop
    let (sender, receiver) = channel::<String>();
    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn stdin reader")?;

    event_loop
        .handle()
        .insert_source(receiver, |event, _metadata, app| match event {
            Event::Msg(line) => match parse_command(&line) {
                Ok(Some(command)) => app.handle(command),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Ignoring input line"),
            },
            Event::Closed => {
                tracing::info!("Input closed, exiting");
                app.running = false;
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert stdin source: {:?}", e))?;

    // Signal handling for graceful shutdown
    let signals = calloop::signals::Signals::new(&[calloop::signals::Signal::SIGINT])
        .context("Failed to create signal handler for graceful shutdown")?;
    event_loop
        .handle()
        .insert_source(signals, |_signal, _metadata, app| {
            tracing::info!("Received SIGINT, exiting gracefully");
            app.running = false;
        })
        .map_err(|e| anyhow::anyhow!("Failed to insert signal handler: {:?}", e))?;

    tracing::info!("Event loop starting");
    app.print();

    while app.running {
        if let Err(e) = event_loop.dispatch(Duration::from_millis(100), &mut app) {
            tracing::error!(error = %e, "Event loop dispatch error");
            return Err(e.into());
        }

        app.reload_config();

        let view_changed = app.view.sync();
        let badge_changed = app.badge.sync();
        if view_changed || badge_changed {
            app.print();
        }
    }

    toast_center::teardown_global_bridge();
    tracing::info!("Toast Center stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_payload() {
        let command = parse_command(r#"{"type":"success","message":"Saved"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            Command::Show(json!({"type": "success", "message": "Saved"}))
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("dismiss toast-3").unwrap(),
            Some(Command::Dismiss(ToastId(3)))
        );
        assert_eq!(parse_command("copy 4").unwrap(), Some(Command::Copy(ToastId(4))));
        assert_eq!(
            parse_command("console toast-1").unwrap(),
            Some(Command::Console(ToastId(1)))
        );
        assert_eq!(parse_command("clear").unwrap(), Some(Command::Clear));
        assert_eq!(parse_command(" quit ").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("dismiss").is_err());
        assert!(parse_command("dismiss abc").is_err());
        assert!(parse_command("explode").is_err());
        assert!(parse_command("{not json").is_err());
    }
}
