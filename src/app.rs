use crate::config::HeraldConfig;
use crate::desktop::{self, DesktopBridge, NotifyRustNotifier};
use crate::event::{Command, Event};
use crate::state::{NotificationStore, Severity, Storage, Timers, ToastData, ToastId, ToastOptions};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Daemon application state
///
/// Owns the single `NotificationStore` and writes the storage document
/// after every change to persisted state.
pub struct App {
    store: NotificationStore,
    storage: Storage,
    /// Sender for work finished off the loop (permission probes)
    event_tx: mpsc::Sender<Event>,
}

impl App {
    /// Build the store from the storage document and config
    pub fn new(config: &HeraldConfig, storage: Storage, event_tx: mpsc::Sender<Event>) -> Self {
        let state = storage.load();
        let notifier = Arc::new(NotifyRustNotifier::new(&config.desktop));
        let store = NotificationStore::from_persisted(
            state,
            Timers::new(event_tx.clone()),
            DesktopBridge::new(notifier),
            config.toasts.clone(),
        );
        Self::with_store(store, storage, event_tx)
    }

    pub fn with_store(
        store: NotificationStore,
        storage: Storage,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            store,
            storage,
            event_tx,
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    /// Kick off work that should happen once the loop is running
    pub fn start(&mut self) {
        tracing::info!(
            notifications = self.store.notification_count(),
            unread = self.store.unread_count(),
            by_category = ?self.store.unread_by_category(),
            filter = ?self.store.filter(),
            last_sync = ?self.store.last_sync(),
            "Notification store ready"
        );
        if self.store.settings().desktop {
            self.spawn_permission_request();
        }
    }

    /// Handle an event from the loop
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Command(command) => self.apply(*command),
            Event::Expired(key) => {
                self.store.handle_expired(key);
            }
            Event::PermissionResolved(permission) => {
                if !self.store.desktop_mut().set_permission(permission) {
                    tracing::warn!(?permission, "Desktop notifications unavailable");
                }
            }
        }
        self.persist_if_dirty();
    }

    fn apply(&mut self, command: Command) {
        tracing::debug!(command = command.name(), "Applying command");

        match command {
            Command::AddNotification(data) => {
                let id = self.store.add_notification(data);
                tracing::info!(id = %id, unread = self.store.unread_count(), "Notification added");
            }
            Command::MarkAsRead { id } => {
                if !self.store.mark_as_read(id) {
                    tracing::debug!(id = %id, "mark_as_read: missing or already read");
                }
            }
            Command::MarkAllAsRead => self.store.mark_all_as_read(),
            Command::RemoveNotification { id } => {
                if self.store.remove_notification(id).is_none() {
                    tracing::debug!(id = %id, "remove_notification: not found");
                }
            }
            Command::ClearNotifications => self.store.clear_notifications(),
            Command::ShowToast(data) => {
                let kind = data.kind;
                let message = data.message.clone();
                let id = self.show_toast(data);
                tracing::info!(id = %id, kind = kind.as_str(), message = %message, "Toast");
            }
            Command::HideToast { id } => {
                self.store.hide_toast(id);
            }
            Command::ClearToasts => self.store.clear_toasts(),
            Command::UpdateSettings(patch) => {
                let desktop_turned_on =
                    patch.desktop == Some(true) && !self.store.settings().desktop;
                self.store.update_settings(patch);
                if desktop_turned_on {
                    self.spawn_permission_request();
                }
            }
            Command::SetFilter { filter } => {
                self.store.set_filter(filter);
                tracing::debug!(?filter, matching = self.store.filtered().len(), "Filter set");
            }
            Command::RequestPermission => self.spawn_permission_request(),
            Command::Sync => {
                self.store.sync();
            }
        }
    }

    /// Toasts without an explicit delay take the default for their type
    fn show_toast(&mut self, data: ToastData) -> ToastId {
        if data.auto_close.is_some() || data.persistent {
            return self.store.show_toast(data);
        }

        let options = ToastOptions {
            title: data.title,
            actions: data.actions,
            ..Default::default()
        };
        match data.kind {
            Severity::Success => self.store.show_success(&data.message, options),
            Severity::Error => self.store.show_error(&data.message, options),
            Severity::Warning => self.store.show_warning(&data.message, options),
            Severity::Info => self.store.show_info(&data.message, options),
        }
    }

    /// Probe permission off the loop; the result comes back as an event
    fn spawn_permission_request(&self) {
        let notifier = self.store.desktop().notifier();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let permission = desktop::probe_permission(notifier).await;
            if tx.send(Event::PermissionResolved(permission)).await.is_err() {
                tracing::debug!("Event loop gone before permission resolved");
            }
        });
    }

    fn persist_if_dirty(&mut self) {
        if !self.store.take_dirty() {
            return;
        }
        if let Err(e) = self.storage.save(&self.store.snapshot()) {
            tracing::warn!("Failed to save storage document: {}", e);
        }
    }
}
