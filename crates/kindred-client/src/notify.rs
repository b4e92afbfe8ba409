//! Transient user notifications ("toasts").

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;
const HISTORY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub title: String,
    pub description: Option<String>,
}

/// Fans notifications out to every subscribed renderer and keeps a short
/// history of the most recent ones.
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    history: Mutex<VecDeque<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_LEN)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, title: impl Into<String>) {
        self.emit(Level::Success, title.into(), None);
    }

    pub fn info(&self, title: impl Into<String>) {
        self.emit(Level::Info, title.into(), None);
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(Level::Error, title.into(), Some(description.into()));
    }

    fn emit(&self, level: Level, title: String, description: Option<String>) {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            title,
            description,
        };
        match level {
            Level::Error => tracing::warn!(
                title = %notification.title,
                description = notification.description.as_deref().unwrap_or(""),
                "Error notification"
            ),
            _ => tracing::debug!(title = %notification.title, "Notification"),
        }

        {
            let mut history = self.history.lock();
            if history.len() == HISTORY_LEN {
                history.pop_front();
            }
            history.push_back(notification.clone());
        }

        // No subscribers is fine: nothing is rendering notifications.
        let _ = self.tx.send(notification);
    }

    /// Most recent notifications, oldest first.
    pub fn recent(&self) -> Vec<Notification> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.history.lock().back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.error("Failed to send message", "Backend error (500): down");
        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, Level::Error);
        assert_eq!(received.title, "Failed to send message");
        assert_eq!(notifier.last(), Some(received));
    }

    #[test]
    fn test_history_is_bounded() {
        let notifier = Notifier::new();
        for n in 0..(HISTORY_LEN + 5) {
            notifier.info(format!("n{n}"));
        }
        let recent = notifier.recent();
        assert_eq!(recent.len(), HISTORY_LEN);
        assert_eq!(recent[0].title, "n5");
    }
}
