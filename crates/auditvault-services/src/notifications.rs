//! Process-wide notification queue
//!
//! Notifications are kept newest-first. Success notifications expire on their
//! own after the configured TTL; everything else stays until cleared.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

/// Cheap to clone; clones share the same queue.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    entries: Arc<Mutex<Vec<Notification>>>,
    success_ttl: Duration,
}

impl NotificationCenter {
    pub fn new(success_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            success_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        // A panic while holding the lock cannot leave the Vec half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> String {
        self.add_with_action(kind, title, message, None)
    }

    pub fn add_with_action(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        action_url: Option<String>,
    ) -> String {
        let notification = Notification {
            id: uuid::Uuid::new_v4().simple().to_string(),
            kind,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            action_url,
        };
        let id = notification.id.clone();
        tracing::debug!(title = %notification.title, kind = ?kind, "Notification added");
        self.lock().insert(0, notification);

        if kind == NotificationKind::Success {
            self.schedule_expiry(id.clone());
        }

        id
    }

    fn schedule_expiry(&self, id: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(id = %id, "No runtime, success notification will not expire");
            return;
        };
        let center = self.clone();
        let ttl = self.success_ttl;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            center.clear(&id);
        });
    }

    pub fn mark_as_read(&self, id: &str) {
        if let Some(n) = self.lock().iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn clear(&self, id: &str) {
        self.lock().retain(|n| n.id != id);
    }

    pub fn unread_count(&self) -> usize {
        self.lock().iter().filter(|n| !n.read).count()
    }

    pub fn list(&self) -> Vec<Notification> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn success_expires_after_ttl() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        center.add(NotificationKind::Success, "Approved", "Inspection approved");
        let warning = center.add(NotificationKind::Warning, "Rejected", "Inspection rejected");
        assert_eq!(center.list().len(), 2);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(center.list().len(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let remaining = center.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, warning);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_persist_until_cleared() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        let id = center.add(NotificationKind::Error, "Failed", "Upload failed");

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(center.list().len(), 1);

        center.clear(&id);
        assert!(center.list().is_empty());
    }

    #[test]
    fn newest_first_and_unread_count() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        let first = center.add(NotificationKind::Info, "one", "");
        let second = center.add(NotificationKind::Warning, "two", "");

        let list = center.list();
        assert_eq!(list[0].id, second);
        assert_eq!(list[1].id, first);
        assert_eq!(center.unread_count(), 2);

        center.mark_as_read(&first);
        assert_eq!(center.unread_count(), 1);
    }
}
