//! Notification delivery channels.
//!
//! A channel delivers one rendered message to one recipient. Delivery is
//! opaque to the dispatcher: a channel may send email, persist an in-app
//! row, or both (composite).

mod email;
mod in_app;

pub use email::EmailRelayChannel;
pub use in_app::InAppChannel;

use std::sync::Arc;

use async_trait::async_trait;

use tickethub_core::result::AppResult;
use tickethub_entity::user::User;

use crate::message::NotificationMessage;

/// Trait for notification delivery channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Deliver one message to one recipient.
    async fn notify(&self, recipient: &User, message: &NotificationMessage) -> AppResult<()>;
}

/// Delivers through every configured sub-channel in order.
///
/// Any sub-channel error fails the recipient's delivery as a whole; the
/// dispatcher's per-recipient boundary contains it.
pub struct CompositeChannel {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl CompositeChannel {
    /// Create a composite over the given sub-channels.
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl NotificationChannel for CompositeChannel {
    fn channel_type(&self) -> &'static str {
        "composite"
    }

    async fn notify(&self, recipient: &User, message: &NotificationMessage) -> AppResult<()> {
        for channel in &self.channels {
            channel.notify(recipient, message).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use tickethub_entity::notification::NotificationKind;
    use tickethub_entity::user::UserRole;
    use uuid::Uuid;

    struct RecordingChannel {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        fn channel_type(&self) -> &'static str {
            self.name
        }

        async fn notify(&self, _recipient: &User, _message: &NotificationMessage) -> AppResult<()> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(tickethub_core::AppError::delivery("boom"));
            }
            Ok(())
        }
    }

    fn recipient() -> User {
        User {
            id: Uuid::new_v4(),
            email: "r@x.com".to_string(),
            name: "R".to_string(),
            email_notifications: None,
            roles: vec![UserRole::Tenant],
            created_at: Utc::now(),
        }
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketCreated,
            title: "t".to_string(),
            body: "b".to_string(),
            payload: serde_json::json!({}),
            ticket_id: None,
            actor_id: None,
        }
    }

    #[tokio::test]
    async fn test_composite_delivers_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeChannel::new(vec![
            Arc::new(RecordingChannel { name: "email", log: Arc::clone(&log), fail: false }),
            Arc::new(RecordingChannel { name: "in_app", log: Arc::clone(&log), fail: false }),
        ]);

        composite.notify(&recipient(), &message()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["email", "in_app"]);
    }

    #[tokio::test]
    async fn test_composite_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeChannel::new(vec![
            Arc::new(RecordingChannel { name: "email", log: Arc::clone(&log), fail: true }),
            Arc::new(RecordingChannel { name: "in_app", log: Arc::clone(&log), fail: false }),
        ]);

        let err = composite.notify(&recipient(), &message()).await.unwrap_err();
        assert_eq!(err.kind, tickethub_core::error::ErrorKind::Delivery);
        assert_eq!(*log.lock().unwrap(), ["email"]);
    }
}
