//! Cancellable auto-close timers
//!
//! Each timer is a tokio task that sleeps and then posts `Event::Expired`
//! back into the event loop. Timers are keyed by the entry they close, and
//! aborted when that entry is removed by hand. An expiry only counts if its
//! key is still registered, so a timer that fired before it could be
//! aborted is dropped on arrival.

use crate::event::Event;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::notification::{NotificationId, ToastId};

/// Entry an auto-close timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    Notification(NotificationId),
    Toast(ToastId),
}

/// Registry of pending auto-close timers
#[derive(Debug, Default)]
pub struct Timers {
    /// Event loop sender (None = timers disabled, e.g. one-shot CLI)
    tx: Option<mpsc::Sender<Event>>,
    pending: HashMap<TimerKey, AbortHandle>,
}

impl Timers {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self {
            tx: Some(tx),
            pending: HashMap::new(),
        }
    }

    /// Timers that never fire
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Schedule an expiry for `key`, replacing any timer already pending for it
    pub fn schedule(&mut self, key: TimerKey, delay: Duration) {
        self.cancel(key);

        let Some(tx) = self.tx.clone() else {
            tracing::debug!(?key, "Timers disabled, not scheduling auto-close");
            return;
        };

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the loop is shutting down
            let _ = tx.send(Event::Expired(key)).await;
        });

        tracing::trace!(?key, delay_ms = delay.as_millis() as u64, "Auto-close scheduled");
        self.pending.insert(key, handle.abort_handle());
    }

    /// Abort the timer for `key`, if any
    pub fn cancel(&mut self, key: TimerKey) {
        if let Some(handle) = self.pending.remove(&key) {
            handle.abort();
            tracing::trace!(?key, "Auto-close cancelled");
        }
    }

    /// Abort every pending timer matching `pred`
    pub fn cancel_where(&mut self, pred: impl Fn(&TimerKey) -> bool) {
        self.pending.retain(|key, handle| {
            if pred(key) {
                handle.abort();
                false
            } else {
                true
            }
        });
    }

    /// Consume an expiry. Returns false if the timer was cancelled or replaced.
    pub fn fired(&mut self, key: TimerKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_posts_expiry_after_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timers = Timers::new(tx);
        let key = TimerKey::Toast(ToastId(1));

        timers.schedule(key, Duration::from_millis(5000));
        assert!(timers.is_pending(key));

        let start = tokio::time::Instant::now();
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::Expired(k) if k == key));
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert!(timers.fired(key));
        assert!(!timers.is_pending(key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_posts() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut timers = Timers::new(tx);
        let key = TimerKey::Notification(NotificationId(7));

        timers.schedule(key, Duration::from_millis(100));
        timers.cancel(key);

        let result = tokio::time::timeout(Duration::from_secs(60), rx.recv()).await;
        assert!(result.is_err(), "cancelled timer should not fire");
        assert!(!timers.fired(key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_where_only_matches_predicate() {
        let (tx, _rx) = mpsc::channel(8);
        let mut timers = Timers::new(tx);

        timers.schedule(TimerKey::Toast(ToastId(1)), Duration::from_secs(5));
        timers.schedule(TimerKey::Toast(ToastId(2)), Duration::from_secs(5));
        timers.schedule(TimerKey::Notification(NotificationId(1)), Duration::from_secs(5));

        timers.cancel_where(|k| matches!(k, TimerKey::Toast(_)));

        assert_eq!(timers.pending_count(), 1);
        assert!(timers.is_pending(TimerKey::Notification(NotificationId(1))));
    }

    #[test]
    fn test_disabled_timers_schedule_nothing() {
        let mut timers = Timers::disabled();
        timers.schedule(TimerKey::Toast(ToastId(1)), Duration::from_secs(1));
        assert_eq!(timers.pending_count(), 0);
    }
}
