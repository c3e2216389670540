//! In-app notification center
//!
//! Holds the notification list with per-item read state. The drawer that
//! renders the list is a consumer; only the list state lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use app_state::BadgeDisplay;

/// Kinds of in-app notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Order lifecycle updates
    Order,
    /// Sales and promotions
    Promotion,
    /// Everything else
    System,
}

/// A single in-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique id
    pub id: String,
    /// Kind, drives the icon shown next to the entry
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
    /// Whether the user has seen it
    #[serde(default)]
    pub read: bool,
}

/// In-memory notification list with read tracking
///
/// Notifications are kept newest-first. Marking an unknown id is a no-op,
/// matching the rest of the state layer's absent-id semantics.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    /// Create an empty notification center
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a notification, keeping the list newest-first
    pub fn push(&mut self, notification: Notification) {
        let at = self
            .items
            .iter()
            .position(|n| n.created_at < notification.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(at, notification);
    }

    /// Notifications, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Number of notifications
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark one notification read
    ///
    /// Returns whether anything changed; already-read or unknown ids are
    /// a no-op.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                true
            }
            _ => false,
        }
    }

    /// Mark every notification read
    pub fn mark_all_read(&mut self) {
        for notification in &mut self.items {
            notification.read = true;
        }
    }

    /// Remove a notification; no-op when the id is absent
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    /// Number of unread notifications
    pub fn unread_count(&self) -> u32 {
        self.items.iter().filter(|n| !n.read).count() as u32
    }

    /// Unread count clamped for badge display
    pub fn badge(&self) -> BadgeDisplay {
        BadgeDisplay::from_count(self.unread_count())
    }
}
