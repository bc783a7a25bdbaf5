//! In-app inbox delivery.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;

use tickethub_core::config::notifier::InAppConfig;
use tickethub_core::result::AppResult;
use tickethub_entity::notification::Notification;
use tickethub_entity::traits::NotificationStore;
use tickethub_entity::user::User;

use super::NotificationChannel;
use crate::message::NotificationMessage;

/// Persists one notification row per recipient for the in-app inbox.
pub struct InAppChannel {
    store: Arc<dyn NotificationStore>,
    config: InAppConfig,
}

impl InAppChannel {
    /// Create a new in-app channel over the given store.
    pub fn new(store: Arc<dyn NotificationStore>, config: InAppConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl NotificationChannel for InAppChannel {
    fn channel_type(&self) -> &'static str {
        "in_app"
    }

    async fn notify(&self, recipient: &User, message: &NotificationMessage) -> AppResult<()> {
        if !self.config.enabled {
            debug!(user_id = %recipient.id, "In-app channel disabled, skipping");
            return Ok(());
        }

        let now = Utc::now();
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: recipient.id,
            kind: message.kind.as_str().to_string(),
            title: message.title.clone(),
            body: message.body.clone(),
            payload: Some(message.payload.clone()),
            actor_id: message.actor_id,
            ticket_id: message.ticket_id,
            is_read: Some(false),
            read_at: None,
            is_dismissed: Some(false),
            created_at: now,
            expires_at: Some(now + Duration::days(i64::from(self.config.cleanup_after_days))),
        };

        self.store.insert(&notification).await?;

        debug!(user_id = %recipient.id, kind = %message.kind, "In-app notification stored");
        Ok(())
    }
}
