//! In-app notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A notification delivered to a user's in-app inbox.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Event kind that produced this notification, as its canonical string.
    pub kind: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Additional structured data (JSON).
    pub payload: Option<serde_json::Value>,
    /// The user who triggered the event, if applicable.
    pub actor_id: Option<Uuid>,
    /// The ticket the notification refers to.
    pub ticket_id: Option<Uuid>,
    /// Whether the user has read this notification.
    pub is_read: Option<bool>,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// Whether the user dismissed this notification.
    pub is_dismissed: Option<bool>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Check if the notification has been read.
    pub fn is_unread(&self) -> bool {
        !self.is_read.unwrap_or(false)
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }
}
