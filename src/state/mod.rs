mod notification;
mod persist;
mod settings;
mod timers;

pub use notification::{
    Action, Category, Notification, NotificationData, NotificationId, Severity, Toast, ToastData,
    ToastId, ToastOptions,
};
pub use persist::{PersistedState, Storage};
pub use settings::{
    CategoryToggles, NotificationFilter, QuietHours, Settings, SettingsPatch, TimeOfDay,
};
pub use timers::{TimerKey, Timers};

use crate::config::{
    ToastConfig, DEFAULT_TOAST_MS, MAX_NOTIFICATIONS, MAX_PERSISTED_NOTIFICATIONS, MAX_TOASTS,
};
use crate::desktop::{DesktopBridge, DesktopMessage};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Notification center state
///
/// Owns the inbox (most recent first), the visible toasts (oldest first),
/// the user settings and the auto-close timers. All mutation goes through
/// `&mut self`; the daemon keeps exactly one of these on its event loop.
#[derive(Debug)]
pub struct NotificationStore {
    /// Inbox, most recent first
    notifications: VecDeque<Notification>,
    /// Cached number of unread notifications
    unread_count: usize,
    /// Visible toasts, oldest first
    toasts: VecDeque<Toast>,
    settings: Settings,
    filter: NotificationFilter,
    last_sync: Option<DateTime<Utc>>,
    next_notification_id: u64,
    next_toast_id: u64,
    toast_durations: ToastConfig,
    timers: Timers,
    desktop: DesktopBridge,
    /// Set when persisted state changed since the last `take_dirty`
    dirty: bool,
}

impl NotificationStore {
    pub fn new(timers: Timers, desktop: DesktopBridge, toast_durations: ToastConfig) -> Self {
        Self {
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            unread_count: 0,
            toasts: VecDeque::with_capacity(MAX_TOASTS),
            settings: Settings::default(),
            filter: NotificationFilter::default(),
            last_sync: None,
            next_notification_id: 1,
            next_toast_id: 1,
            toast_durations,
            timers,
            desktop,
            dirty: false,
        }
    }

    /// Rebuild a store from a storage document
    ///
    /// Auto-close timers are not restored; entries loaded from disk stay
    /// until read or removed.
    pub fn from_persisted(
        state: PersistedState,
        timers: Timers,
        desktop: DesktopBridge,
        toast_durations: ToastConfig,
    ) -> Self {
        let mut store = Self::new(timers, desktop, toast_durations);

        let mut notifications: VecDeque<Notification> = state.notifications.into();
        notifications.truncate(MAX_NOTIFICATIONS);

        store.next_notification_id = notifications
            .iter()
            .map(|n| n.id.0)
            .max()
            .map_or(1, |max| max + 1);
        store.unread_count = notifications.iter().filter(|n| !n.read).count();
        store.notifications = notifications;
        store.settings = state.settings;
        store.filter = state.filter;
        store.last_sync = state.last_sync;
        store
    }

    // ---- notifications -------------------------------------------------

    /// Add a notification to the front of the inbox
    pub fn add_notification(&mut self, data: NotificationData) -> NotificationId {
        let id = NotificationId(self.next_notification_id);
        self.next_notification_id += 1;

        let notification = Notification::from_data(id, data, Utc::now());
        let expiry = notification.expiry_ms();

        let wants_desktop = self.settings.desktop
            && !notification.kind.is_lowest()
            && self.settings.categories.allows(notification.category);
        let desktop_message = wants_desktop.then(|| DesktopMessage {
            title: notification.title.clone(),
            body: notification.message.clone(),
            icon: None,
            tag: Some(id.to_string()),
        });

        tracing::debug!(
            id = %id,
            kind = notification.kind.as_str(),
            category = notification.category.as_str(),
            "Notification added"
        );

        self.notifications.push_front(notification);
        self.unread_count += 1;

        while self.notifications.len() > MAX_NOTIFICATIONS {
            if let Some(dropped) = self.notifications.pop_back() {
                self.forget_notification(&dropped);
            }
        }

        if let Some(message) = desktop_message {
            self.desktop.send(&self.settings, message);
        }

        if let Some(ms) = expiry {
            self.timers
                .schedule(TimerKey::Notification(id), Duration::from_millis(ms));
        }

        self.dirty = true;
        id
    }

    /// Mark one notification as read. Returns false if missing or already read.
    pub fn mark_as_read(&mut self, id: NotificationId) -> bool {
        let Some(notification) = self.notifications.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if notification.read {
            return false;
        }

        notification.read = true;
        self.unread_count = self.unread_count.saturating_sub(1);
        self.dirty = true;
        true
    }

    pub fn mark_all_as_read(&mut self) {
        for notification in &mut self.notifications {
            notification.read = true;
        }
        self.unread_count = 0;
        self.dirty = true;
    }

    /// Delete a notification. Returns the removed entry if it existed.
    pub fn remove_notification(&mut self, id: NotificationId) -> Option<Notification> {
        let pos = self.notifications.iter().position(|n| n.id == id)?;
        let removed = self.notifications.remove(pos)?;
        self.forget_notification(&removed);
        self.dirty = true;
        Some(removed)
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.unread_count = 0;
        self.timers
            .cancel_where(|key| matches!(key, TimerKey::Notification(_)));
        self.dirty = true;
    }

    /// Bookkeeping for an entry that left the inbox
    fn forget_notification(&mut self, notification: &Notification) {
        if !notification.read {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
        self.timers.cancel(TimerKey::Notification(notification.id));
    }

    // ---- toasts --------------------------------------------------------

    /// Show a toast, dropping the oldest if more than `MAX_TOASTS` are visible
    pub fn show_toast(&mut self, data: ToastData) -> ToastId {
        let auto_close = if data.persistent {
            None
        } else {
            Some(data.auto_close.unwrap_or(DEFAULT_TOAST_MS))
        };
        self.push_toast(data, auto_close)
    }

    pub fn show_success(&mut self, message: &str, options: ToastOptions) -> ToastId {
        self.show_kind(Severity::Success, message, options)
    }

    /// Error toasts auto-close like the rest unless marked persistent
    pub fn show_error(&mut self, message: &str, options: ToastOptions) -> ToastId {
        self.show_kind(Severity::Error, message, options)
    }

    pub fn show_warning(&mut self, message: &str, options: ToastOptions) -> ToastId {
        self.show_kind(Severity::Warning, message, options)
    }

    pub fn show_info(&mut self, message: &str, options: ToastOptions) -> ToastId {
        self.show_kind(Severity::Info, message, options)
    }

    fn show_kind(&mut self, kind: Severity, message: &str, options: ToastOptions) -> ToastId {
        let default_ms = match kind {
            Severity::Success => self.toast_durations.success_ms,
            Severity::Error => self.toast_durations.error_ms,
            Severity::Warning => self.toast_durations.warning_ms,
            Severity::Info => self.toast_durations.info_ms,
        };
        let auto_close = if options.persistent {
            None
        } else {
            Some(options.auto_close.unwrap_or(default_ms))
        };

        let data = ToastData {
            kind,
            title: options.title,
            message: message.to_string(),
            auto_close: options.auto_close,
            persistent: options.persistent,
            actions: options.actions,
        };
        self.push_toast(data, auto_close)
    }

    fn push_toast(&mut self, data: ToastData, auto_close: Option<u64>) -> ToastId {
        let id = ToastId(self.next_toast_id);
        self.next_toast_id += 1;

        self.toasts.push_back(Toast {
            id,
            kind: data.kind,
            title: data.title,
            message: data.message,
            auto_close,
            actions: data.actions,
            created_at: Utc::now(),
        });

        while self.toasts.len() > MAX_TOASTS {
            if let Some(dropped) = self.toasts.pop_front() {
                self.timers.cancel(TimerKey::Toast(dropped.id));
            }
        }

        if let Some(ms) = auto_close {
            self.timers
                .schedule(TimerKey::Toast(id), Duration::from_millis(ms));
        }

        tracing::debug!(id = %id, kind = data.kind.as_str(), ?auto_close, "Toast shown");
        id
    }

    /// Remove a toast. Hiding a toast that is already gone is a no-op.
    pub fn hide_toast(&mut self, id: ToastId) -> bool {
        self.timers.cancel(TimerKey::Toast(id));
        match self.toasts.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.toasts.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove every toast and cancel their pending auto-close timers
    pub fn clear_toasts(&mut self) {
        self.toasts.clear();
        self.timers.cancel_where(|key| matches!(key, TimerKey::Toast(_)));
    }

    // ---- timers --------------------------------------------------------

    /// Apply an auto-close expiry. Stale expiries are ignored.
    pub fn handle_expired(&mut self, key: TimerKey) -> bool {
        if !self.timers.fired(key) {
            tracing::trace!(?key, "Ignoring stale auto-close");
            return false;
        }

        match key {
            TimerKey::Notification(id) => {
                let removed = self.remove_notification(id).is_some();
                if removed {
                    tracing::debug!(id = %id, "Notification auto-closed");
                }
                removed
            }
            TimerKey::Toast(id) => self.hide_toast(id),
        }
    }

    // ---- settings & misc -----------------------------------------------

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        if patch.is_empty() {
            return;
        }
        self.settings.merge(patch);
        self.dirty = true;
        tracing::info!(settings = ?self.settings, "Settings updated");
    }

    pub fn set_filter(&mut self, filter: NotificationFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.dirty = true;
        }
    }

    /// Record a sync. There is no backend; only the timestamp changes.
    pub fn sync(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.last_sync = Some(now);
        self.dirty = true;
        tracing::info!(at = %now, "Notifications synced");
        now
    }

    // ---- queries -------------------------------------------------------

    /// Inbox, most recent first
    #[cfg(test)]
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    #[cfg(test)]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    /// Inbox entries matching the current filter
    pub fn filtered(&self) -> Vec<&Notification> {
        apply_filter(self.notifications.iter(), self.filter)
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn unread_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for n in self.notifications.iter().filter(|n| !n.read) {
            *counts.entry(n.category).or_insert(0) += 1;
        }
        counts
    }

    /// Visible toasts, oldest first
    #[cfg(test)]
    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn toast_count(&self) -> usize {
        self.toasts.len()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn filter(&self) -> NotificationFilter {
        self.filter
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn desktop(&self) -> &DesktopBridge {
        &self.desktop
    }

    pub fn desktop_mut(&mut self) -> &mut DesktopBridge {
        &mut self.desktop
    }

    /// Document to persist (most recent `MAX_PERSISTED_NOTIFICATIONS` only)
    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            notifications: self
                .notifications
                .iter()
                .take(MAX_PERSISTED_NOTIFICATIONS)
                .cloned()
                .collect(),
            settings: self.settings.clone(),
            filter: self.filter,
            last_sync: self.last_sync,
        }
    }

    /// Returns true once after any change to persisted state
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Select inbox entries for a filter, preserving order
pub fn apply_filter<'a>(
    notifications: impl Iterator<Item = &'a Notification>,
    filter: NotificationFilter,
) -> Vec<&'a Notification> {
    notifications
        .filter(|n| match filter {
            NotificationFilter::All => true,
            NotificationFilter::Unread => !n.read,
            NotificationFilter::Category(category) => n.category == category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::testing::RecordingNotifier;
    use crate::desktop::Permission;
    use crate::event::Event;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn make_store() -> NotificationStore {
        let notifier = Arc::new(RecordingNotifier::default());
        NotificationStore::new(
            Timers::disabled(),
            DesktopBridge::new(notifier),
            ToastConfig::default(),
        )
    }

    fn make_timed_store() -> (NotificationStore, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(64);
        let notifier = Arc::new(RecordingNotifier::default());
        let store = NotificationStore::new(
            Timers::new(tx),
            DesktopBridge::new(notifier),
            ToastConfig::default(),
        );
        (store, rx)
    }

    fn data(kind: Severity, title: &str) -> NotificationData {
        NotificationData::new(kind, Category::Order, title, "body")
    }

    fn assert_unread_invariant(store: &NotificationStore) {
        let actual = store.notifications().filter(|n| !n.read).count();
        assert_eq!(store.unread_count(), actual, "unread_count out of sync");
    }

    #[test]
    fn test_add_notification_scenario() {
        let mut store = make_store();
        store.add_notification(data(Severity::Info, "older"));
        let before = store.unread_count();

        let id = store.add_notification(NotificationData::new(
            Severity::Success,
            Category::Order,
            "A",
            "B",
        ));

        let first = store.notifications().next().unwrap();
        assert_eq!(first.id, id);
        assert_eq!(first.title, "A");
        assert_eq!(first.message, "B");
        assert_eq!(first.category, Category::Order);
        assert!(!first.read);
        assert_eq!(store.unread_count(), before + 1);
        assert!(store.take_dirty());
    }

    #[test]
    fn test_inbox_capped_and_most_recent_first() {
        let mut store = make_store();
        let mut ids = Vec::new();
        for i in 0..130 {
            ids.push(store.add_notification(data(Severity::Info, &format!("n{i}"))));
            assert!(store.notification_count() <= MAX_NOTIFICATIONS);
        }

        assert_eq!(store.notification_count(), MAX_NOTIFICATIONS);
        let listed: Vec<NotificationId> = store.notifications().map(|n| n.id).collect();
        let expected: Vec<NotificationId> =
            ids.iter().rev().take(MAX_NOTIFICATIONS).copied().collect();
        assert_eq!(listed, expected);
        assert_eq!(store.unread_count(), MAX_NOTIFICATIONS);
        assert_unread_invariant(&store);
    }

    #[test]
    fn test_dropping_read_entries_keeps_unread_count() {
        let mut store = make_store();
        for i in 0..MAX_NOTIFICATIONS {
            store.add_notification(data(Severity::Info, &format!("n{i}")));
        }
        store.mark_all_as_read();
        store.add_notification(data(Severity::Info, "fresh"));

        assert_eq!(store.unread_count(), 1);
        assert_unread_invariant(&store);
    }

    #[test]
    fn test_mark_as_read_once() {
        let mut store = make_store();
        let id = store.add_notification(data(Severity::Warning, "w"));

        assert!(store.mark_as_read(id));
        assert_eq!(store.unread_count(), 0);
        assert!(!store.mark_as_read(id));
        assert_eq!(store.unread_count(), 0);
        assert!(!store.mark_as_read(NotificationId(999)));
        assert_unread_invariant(&store);
    }

    #[test]
    fn test_remove_unread_and_read() {
        let mut store = make_store();
        let a = store.add_notification(data(Severity::Info, "a"));
        let b = store.add_notification(data(Severity::Info, "b"));
        store.mark_as_read(b);
        assert_eq!(store.unread_count(), 1);

        assert!(store.remove_notification(b).is_some());
        assert_eq!(store.unread_count(), 1);
        assert!(store.remove_notification(a).is_some());
        assert_eq!(store.unread_count(), 0);
        assert!(store.remove_notification(a).is_none());
        assert_unread_invariant(&store);
    }

    #[test]
    fn test_unread_invariant_over_mixed_sequence() {
        let mut store = make_store();
        let mut ids = Vec::new();

        for step in 0..300u64 {
            match step % 7 {
                0 | 1 | 2 => ids.push(store.add_notification(data(Severity::Info, "x"))),
                3 => {
                    if let Some(id) = ids.get((step as usize * 31) % ids.len().max(1)) {
                        store.mark_as_read(*id);
                    }
                }
                4 => {
                    if let Some(id) = ids.get((step as usize * 17) % ids.len().max(1)) {
                        store.remove_notification(*id);
                    }
                }
                5 if step % 70 == 5 => store.mark_all_as_read(),
                6 if step % 140 == 6 => store.clear_notifications(),
                _ => {}
            }
            assert_unread_invariant(&store);
            assert!(store.notification_count() <= MAX_NOTIFICATIONS);
        }
    }

    #[test]
    fn test_mark_all_and_clear() {
        let mut store = make_store();
        for _ in 0..5 {
            store.add_notification(data(Severity::Error, "e"));
        }

        store.mark_all_as_read();
        assert_eq!(store.unread_count(), 0);
        assert!(store.notifications().all(|n| n.read));

        store.clear_notifications();
        assert_eq!(store.notification_count(), 0);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn test_toasts_capped_at_five() {
        let mut store = make_store();
        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(store.show_toast(ToastData::new(Severity::Info, &format!("t{i}"))));
            assert!(store.toast_count() <= MAX_TOASTS);
        }

        let visible: Vec<ToastId> = store.toasts().map(|t| t.id).collect();
        assert_eq!(visible, ids[3..].to_vec());
    }

    #[test]
    fn test_hide_toast_idempotent() {
        let mut store = make_store();
        let id = store.show_toast(ToastData::new(Severity::Success, "saved"));

        assert!(store.hide_toast(id));
        assert!(!store.hide_toast(id));
        assert!(!store.hide_toast(ToastId(42)));
        assert_eq!(store.toast_count(), 0);
    }

    #[test]
    fn test_show_toast_defaults() {
        let mut store = make_store();
        store.show_toast(ToastData::new(Severity::Warning, "careful"));
        let mut sticky = ToastData::new(Severity::Info, "stays");
        sticky.persistent = true;
        store.show_toast(sticky);

        let toasts: Vec<&Toast> = store.toasts().collect();
        assert_eq!(toasts[0].auto_close, Some(DEFAULT_TOAST_MS));
        assert_eq!(toasts[1].auto_close, None);
    }

    #[test]
    fn test_show_wrappers_use_severity_defaults() {
        let mut store = make_store();
        store.show_success("ok", ToastOptions::default());
        store.show_info("fyi", ToastOptions::default());
        store.show_warning("hmm", ToastOptions::default());
        store.show_error("network down", ToastOptions::default());
        store.show_error(
            "card declined",
            ToastOptions {
                persistent: true,
                ..Default::default()
            },
        );

        let toasts: Vec<(Severity, Option<u64>)> =
            store.toasts().map(|t| (t.kind, t.auto_close)).collect();
        assert_eq!(
            toasts,
            vec![
                (Severity::Success, Some(3000)),
                (Severity::Info, Some(4000)),
                (Severity::Warning, Some(5000)),
                (Severity::Error, Some(5000)),
                (Severity::Error, None),
            ]
        );
    }

    #[test]
    fn test_toasts_do_not_mark_dirty() {
        let mut store = make_store();
        store.show_info("transient", ToastOptions::default());
        assert!(!store.take_dirty());
    }

    #[test]
    fn test_filter_and_category_counts() {
        let mut store = make_store();
        let a = store.add_notification(NotificationData::new(
            Severity::Info,
            Category::Order,
            "a",
            "m",
        ));
        store.add_notification(NotificationData::new(
            Severity::Info,
            Category::Voucher,
            "b",
            "m",
        ));
        store.add_notification(NotificationData::new(
            Severity::Info,
            Category::Order,
            "c",
            "m",
        ));
        store.mark_as_read(a);

        store.set_filter(NotificationFilter::Unread);
        assert_eq!(store.filtered().len(), 2);

        store.set_filter(NotificationFilter::Category(Category::Order));
        let titles: Vec<&str> = store.filtered().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);

        let counts = store.unread_by_category();
        assert_eq!(counts.get(&Category::Order), Some(&1));
        assert_eq!(counts.get(&Category::Voucher), Some(&1));
    }

    #[test]
    fn test_snapshot_keeps_fifty_most_recent() {
        let mut store = make_store();
        for i in 0..80 {
            store.add_notification(data(Severity::Info, &format!("n{i}")));
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.notifications.len(), MAX_PERSISTED_NOTIFICATIONS);
        assert_eq!(snapshot.notifications[0].title, "n79");
    }

    #[test]
    fn test_from_persisted_recomputes_counts_and_ids() {
        let mut store = make_store();
        let a = store.add_notification(data(Severity::Info, "a"));
        store.add_notification(data(Severity::Info, "b"));
        store.mark_as_read(a);
        store.update_settings(SettingsPatch {
            sms: Some(true),
            ..Default::default()
        });

        let notifier = Arc::new(RecordingNotifier::default());
        let mut restored = NotificationStore::from_persisted(
            store.snapshot(),
            Timers::disabled(),
            DesktopBridge::new(notifier),
            ToastConfig::default(),
        );

        assert_eq!(restored.unread_count(), 1);
        assert!(restored.settings().sms);
        let c = restored.add_notification(data(Severity::Info, "c"));
        assert!(c.0 > a.0 + 1, "ids must not be reused after reload");
    }

    #[test]
    fn test_desktop_bridge_skips_info_and_disabled_categories() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut bridge = DesktopBridge::new(notifier.clone());
        bridge.set_permission(Permission::Granted);
        let mut store = NotificationStore::new(Timers::disabled(), bridge, ToastConfig::default());

        store.add_notification(data(Severity::Info, "quiet"));
        let id = store.add_notification(data(Severity::Success, "loud"));
        assert_eq!(notifier.shown().len(), 1);
        assert_eq!(notifier.shown()[0].title, "loud");
        assert_eq!(notifier.shown()[0].tag, Some(id.to_string()));

        store.update_settings(SettingsPatch {
            categories: Some(CategoryToggles {
                order: false,
                ..Default::default()
            }),
            ..Default::default()
        });
        store.add_notification(data(Severity::Error, "muted category"));
        assert_eq!(notifier.shown().len(), 1);

        store.update_settings(SettingsPatch {
            desktop: Some(false),
            categories: Some(CategoryToggles::default()),
            ..Default::default()
        });
        store.add_notification(data(Severity::Error, "desktop off"));
        assert_eq!(notifier.shown().len(), 1);
    }

    #[test]
    fn test_sync_records_timestamp() {
        let mut store = make_store();
        assert!(store.last_sync().is_none());
        let at = store.sync();
        assert_eq!(store.last_sync(), Some(at));
        assert!(store.take_dirty());
        assert!(!store.take_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_error_auto_closes_after_delay() {
        let (mut store, mut rx) = make_timed_store();
        let id = store.show_error("network down", ToastOptions::default());

        let toast = store.toasts().next().unwrap();
        assert_eq!(toast.auto_close, Some(5000));

        let start = tokio::time::Instant::now();
        let Some(Event::Expired(key)) = rx.recv().await else {
            panic!("expected an expiry event");
        };
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert_eq!(key, TimerKey::Toast(id));

        assert!(store.handle_expired(key));
        assert_eq!(store.toast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_auto_close_unless_persistent() {
        let (mut store, mut rx) = make_timed_store();

        let mut sticky = data(Severity::Warning, "sticky");
        sticky.auto_close = Some(1000);
        sticky.persistent = true;
        let sticky_id = store.add_notification(sticky);

        let mut fleeting = data(Severity::Warning, "fleeting");
        fleeting.auto_close = Some(2000);
        let fleeting_id = store.add_notification(fleeting);
        assert_eq!(store.unread_count(), 2);

        let Some(Event::Expired(key)) = rx.recv().await else {
            panic!("expected an expiry event");
        };
        assert_eq!(key, TimerKey::Notification(fleeting_id));
        assert!(store.handle_expired(key));

        assert!(store.get(fleeting_id).is_none());
        assert!(store.get(sticky_id).is_some());
        assert_eq!(store.unread_count(), 1);
        assert_unread_invariant(&store);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_removal_cancels_timer() {
        let (mut store, mut rx) = make_timed_store();
        let mut timed = data(Severity::Success, "timed");
        timed.auto_close = Some(1000);
        let id = store.add_notification(timed);

        store.remove_notification(id);

        let result = tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(result.is_err(), "timer should have been cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_toasts_cancels_timers() {
        let (mut store, mut rx) = make_timed_store();
        store.show_info("one", ToastOptions::default());
        store.show_info("two", ToastOptions::default());

        store.clear_toasts();
        let fresh = store.show_info("three", ToastOptions::default());

        let Some(Event::Expired(key)) = rx.recv().await else {
            panic!("expected an expiry event");
        };
        assert_eq!(key, TimerKey::Toast(fresh));
        assert!(store.handle_expired(key));
        assert_eq!(store.toast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_after_manual_hide_is_ignored() {
        let (mut store, _rx) = make_timed_store();
        let id = store.show_success("done", ToastOptions::default());

        assert!(store.hide_toast(id));
        assert!(!store.handle_expired(TimerKey::Toast(id)));
    }
}
