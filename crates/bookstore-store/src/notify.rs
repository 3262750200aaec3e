//! # Notifications
//!
//! Transient user-facing notifications as a broadcast side-channel.
//!
//! The stores publish; the presentation layer subscribes and renders
//! however it likes (toast, status bar, nothing). The stores never touch
//! presentation primitives.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  CartStore ──┐                                                  │
//! │  AuthStore ──┼──► Notifier (broadcast) ──► any subscribers      │
//! │  ...       ──┘                                                  │
//! │                                                                 │
//! │  No subscribers is fine: publishing is fire-and-forget.         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Severity of a notification, drives the visual treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A transient message for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,

    /// How long the presentation should keep this on screen, in
    /// milliseconds. Auto-dismissal is the subscriber's job.
    pub dismiss_after_ms: u64,
}

/// Broadcast sender for notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    dismiss_after: Duration,
}

impl Notifier {
    /// Creates a notifier with the given auto-dismiss interval.
    pub fn new(dismiss_after: Duration) -> Self {
        let (tx, _) = broadcast::channel(32);
        Notifier { tx, dismiss_after }
    }

    /// Subscribes to future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publishes a notification. Absent subscribers are fine.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        let notification = Notification {
            message: message.into(),
            kind,
            dismiss_after_ms: self.dismiss_after.as_millis() as u64,
        };
        debug!(kind = ?notification.kind, message = %notification.message, "Notification published");
        let _ = self.tx.send(notification);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationKind::Info, message);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(Duration::from_secs(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_notification() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        notifier.success("Added to wishlist");

        let n = rx.recv().await.unwrap();
        assert_eq!(n.kind, NotificationKind::Success);
        assert_eq!(n.message, "Added to wishlist");
        assert_eq!(n.dismiss_after_ms, 3000);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let notifier = Notifier::default();
        notifier.error("nobody listening");
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_messages() {
        let notifier = Notifier::default();
        notifier.info("before subscribe");

        let mut rx = notifier.subscribe();
        notifier.info("after subscribe");

        let n = rx.recv().await.unwrap();
        assert_eq!(n.message, "after subscribe");
    }
}
