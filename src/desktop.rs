//! Cross-platform native desktop notifications
//!
//! Uses notify-rust for native notifications on macOS, Linux, and BSD.
//! Delivery is gated by user settings, by whether the notification service
//! granted permission, and by quiet hours.

use crate::config::DesktopConfig;
use crate::errors::Result;
use crate::state::{Settings, TimeOfDay};
#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::ActionResponse;
use notify_rust::{Notification, Timeout};
use std::sync::Arc;
use std::time::Duration;

/// How long an OS notification stays up (milliseconds)
pub const DESKTOP_TIMEOUT_MS: u32 = 5000;

/// Permission state for desktop delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

/// Payload handed to the OS notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopMessage {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    /// Replaces an earlier notification carrying the same tag
    pub tag: Option<String>,
}

/// OS notification backend
pub trait DesktopNotifier: Send + Sync + 'static {
    /// Display a notification. Must not block the caller.
    fn show(&self, message: DesktopMessage) -> Result<()>;

    /// Ask the notification service whether it will deliver. May block.
    fn probe_permission(&self) -> Result<Permission>;
}

/// notify-rust backend
#[derive(Debug, Clone)]
pub struct NotifyRustNotifier {
    app_name: String,
    icon: Option<String>,
    focus_command: Vec<String>,
}

impl NotifyRustNotifier {
    pub fn new(config: &DesktopConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            icon: config.icon.clone(),
            focus_command: config.focus_command.clone(),
        }
    }
}

impl DesktopNotifier for NotifyRustNotifier {
    fn show(&self, message: DesktopMessage) -> Result<()> {
        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&message.title)
            .body(&message.body)
            .timeout(Timeout::Milliseconds(DESKTOP_TIMEOUT_MS));

        if let Some(icon) = message.icon.as_deref().or(self.icon.as_deref()) {
            notification.icon(icon);
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            notification.action("default", "Open");
            if let Some(tag) = &message.tag {
                notification.hint(notify_rust::Hint::Custom(
                    "x-herald-tag".to_string(),
                    tag.clone(),
                ));
            }
        }

        let focus_command = self.focus_command.clone();

        // Spawn notification on its own thread - don't block the event loop
        std::thread::spawn(move || {
            if let Err(e) = show_blocking(&notification, &focus_command) {
                tracing::warn!(error = %e, "Desktop notification failed");
            }
        });

        Ok(())
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn probe_permission(&self) -> Result<Permission> {
        let info = notify_rust::get_server_information()?;
        tracing::debug!(server = %info.name, vendor = %info.vendor, "Notification server found");
        Ok(Permission::Granted)
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn probe_permission(&self) -> Result<Permission> {
        Ok(Permission::Granted)
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn show_blocking(notification: &Notification, focus_command: &[String]) -> Result<()> {
    let handle = notification.show()?;
    let id = handle.id();
    let focus_command = focus_command.to_vec();

    supervise(
        Duration::from_millis(u64::from(DESKTOP_TIMEOUT_MS)),
        move || {
            let result = notify_rust::handle_action(id, |response| {
                if matches!(response, ActionResponse::Custom(action) if *action == "default") {
                    focus_window(&focus_command);
                }
            });
            if let Err(e) = result {
                tracing::debug!(id, error = %e, "Stopped waiting for notification action");
            }
        },
        move || handle.close(),
    );
    Ok(())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_blocking(notification: &Notification, _focus_command: &[String]) -> Result<()> {
    notification.show()?;
    Ok(())
}

/// Keep a shown notification up for at most `timeout`
///
/// `wait_for_click` runs on its own thread and must return once the
/// notification is closed. `close` runs on the calling thread when the
/// timeout passes, whether or not the server honoured the expiry hint.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn supervise<W, C>(timeout: Duration, wait_for_click: W, close: C)
where
    W: FnOnce() + Send + 'static,
    C: FnOnce(),
{
    std::thread::spawn(wait_for_click);
    std::thread::sleep(timeout);
    close();
}

/// Bring the application window to the front after a click
///
/// Returns true if the focus command was started.
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(dead_code))]
fn focus_window(focus_command: &[String]) -> bool {
    let Some((program, args)) = focus_command.split_first() else {
        tracing::debug!("Notification clicked, no focus command configured");
        return false;
    };

    match std::process::Command::new(program).args(args).spawn() {
        Ok(_) => {
            tracing::debug!(program = %program, "Focus command started");
            true
        }
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "Focus command failed");
            false
        }
    }
}

/// Settings- and permission-aware front to a `DesktopNotifier`
pub struct DesktopBridge {
    notifier: Arc<dyn DesktopNotifier>,
    permission: Permission,
}

impl std::fmt::Debug for DesktopBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopBridge")
            .field("permission", &self.permission)
            .finish_non_exhaustive()
    }
}

impl DesktopBridge {
    pub fn new(notifier: Arc<dyn DesktopNotifier>) -> Self {
        Self {
            notifier,
            permission: Permission::Default,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Store a probe result. Returns true if delivery is now allowed.
    pub fn set_permission(&mut self, permission: Permission) -> bool {
        if self.permission != permission {
            tracing::info!(?permission, "Desktop notification permission changed");
        }
        self.permission = permission;
        permission == Permission::Granted
    }

    /// Backend handle for running a permission probe off the event loop
    pub fn notifier(&self) -> Arc<dyn DesktopNotifier> {
        Arc::clone(&self.notifier)
    }

    /// Send using the local wall clock for the quiet-hours check
    pub fn send(&self, settings: &Settings, message: DesktopMessage) -> bool {
        let now = TimeOfDay::from(chrono::Local::now().time());
        self.send_at(settings, message, now)
    }

    /// Returns true if the message was handed to the OS
    pub fn send_at(&self, settings: &Settings, message: DesktopMessage, now: TimeOfDay) -> bool {
        if !settings.desktop || self.permission != Permission::Granted {
            tracing::trace!(permission = ?self.permission, "Desktop delivery disabled");
            return false;
        }

        if settings.quiet_hours.is_active(now) {
            tracing::debug!(
                now = %now,
                start = %settings.quiet_hours.start,
                end = %settings.quiet_hours.end,
                "Quiet hours, desktop notification suppressed"
            );
            return false;
        }

        match self.notifier.show(message) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to dispatch desktop notification");
                false
            }
        }
    }
}

/// Run the backend's blocking permission probe on the blocking pool
///
/// Failures are logged and resolve to `Denied`.
pub async fn probe_permission(notifier: Arc<dyn DesktopNotifier>) -> Permission {
    match tokio::task::spawn_blocking(move || notifier.probe_permission()).await {
        Ok(Ok(permission)) => permission,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Desktop notification permission probe failed");
            Permission::Denied
        }
        Err(e) => {
            tracing::warn!(error = %e, "Permission probe task panicked");
            Permission::Denied
        }
    }
}
