//! Per-recipient notification delivery with isolated failure boundaries.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use tickethub_entity::user::User;

use crate::channels::NotificationChannel;
use crate::message::NotificationMessage;

/// One recipient's failed delivery.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    /// The recipient the delivery failed for.
    pub recipient_id: Uuid,
    /// The recipient's email.
    pub email: String,
    /// The delivery error, rendered.
    pub error: String,
}

/// Outcome summary of one dispatch run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Deliveries attempted (always the full recipient count).
    pub attempted: usize,
    /// Deliveries that completed.
    pub succeeded: usize,
    /// Per-recipient failures, in recipient order.
    pub failed: Vec<DeliveryFailure>,
}

impl DispatchReport {
    /// Whether every attempted delivery succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delivers one message to each recipient, never letting one recipient's
/// failure block the rest.
///
/// Each delivery runs inside its own failure boundary with a timeout; a
/// hung or failed delivery is recorded and the loop continues. The
/// dispatcher performs no retries — those belong to the job queue, where
/// they apply to whole jobs, not single recipients.
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
    delivery_timeout: Duration,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given channel.
    pub fn new(channel: Arc<dyn NotificationChannel>, delivery_timeout: Duration) -> Self {
        Self {
            channel,
            delivery_timeout,
        }
    }

    /// Deliver `message` to every recipient in order.
    ///
    /// Never fails: per-recipient errors are collected into the report.
    pub async fn dispatch(
        &self,
        recipients: &[User],
        message: &NotificationMessage,
    ) -> DispatchReport {
        let mut report = DispatchReport {
            attempted: recipients.len(),
            ..DispatchReport::default()
        };

        for recipient in recipients {
            let delivery = self.channel.notify(recipient, message);
            match tokio::time::timeout(self.delivery_timeout, delivery).await {
                Ok(Ok(())) => {
                    debug!(
                        user_id = %recipient.id,
                        email = %recipient.email,
                        channel = self.channel.channel_type(),
                        "Delivered notification"
                    );
                    report.succeeded += 1;
                }
                Ok(Err(e)) => {
                    warn!(
                        user_id = %recipient.id,
                        email = %recipient.email,
                        error = %e,
                        "Notification delivery failed"
                    );
                    report.failed.push(DeliveryFailure {
                        recipient_id: recipient.id,
                        email: recipient.email.clone(),
                        error: e.to_string(),
                    });
                }
                Err(_) => {
                    warn!(
                        user_id = %recipient.id,
                        email = %recipient.email,
                        timeout_secs = self.delivery_timeout.as_secs(),
                        "Notification delivery timed out"
                    );
                    report.failed.push(DeliveryFailure {
                        recipient_id: recipient.id,
                        email: recipient.email.clone(),
                        error: format!(
                            "delivery timed out after {}s",
                            self.delivery_timeout.as_secs()
                        ),
                    });
                }
            }
        }

        info!(
            kind = %message.kind,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed.len(),
            "Dispatch complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use tickethub_core::result::AppResult;
    use tickethub_core::AppError;
    use tickethub_entity::notification::NotificationKind;
    use tickethub_entity::user::UserRole;

    struct FlakyChannel {
        fail_for: HashSet<String>,
        attempted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationChannel for FlakyChannel {
        fn channel_type(&self) -> &'static str {
            "flaky"
        }

        async fn notify(&self, recipient: &User, _message: &NotificationMessage) -> AppResult<()> {
            self.attempted.lock().unwrap().push(recipient.email.clone());
            if self.fail_for.contains(&recipient.email) {
                return Err(AppError::delivery("mailbox unavailable"));
            }
            Ok(())
        }
    }

    struct HangingChannel;

    #[async_trait]
    impl NotificationChannel for HangingChannel {
        fn channel_type(&self) -> &'static str {
            "hanging"
        }

        async fn notify(&self, _recipient: &User, _message: &NotificationMessage) -> AppResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: email.to_string(),
            email_notifications: None,
            roles: vec![UserRole::Tenant],
            created_at: Utc::now(),
        }
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketCommented,
            title: "t".to_string(),
            body: "b".to_string(),
            payload: serde_json::json!({}),
            ticket_id: None,
            actor_id: None,
        }
    }

    /// One bad recipient out of N still yields N attempts and N-1
    /// successes.
    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let channel = Arc::new(FlakyChannel {
            fail_for: HashSet::from(["b@x.com".to_string()]),
            attempted: Mutex::new(Vec::new()),
        });
        let dispatcher =
            NotificationDispatcher::new(Arc::clone(&channel) as _, Duration::from_secs(5));

        let recipients = vec![user("a@x.com"), user("b@x.com"), user("c@x.com")];
        let report = dispatcher.dispatch(&recipients, &message()).await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].email, "b@x.com");
        assert!(report.failed[0].error.contains("mailbox unavailable"));

        // Every recipient was attempted, in order.
        assert_eq!(
            *channel.attempted.lock().unwrap(),
            ["a@x.com", "b@x.com", "c@x.com"]
        );
    }

    #[tokio::test]
    async fn test_empty_recipient_list() {
        let channel = Arc::new(FlakyChannel {
            fail_for: HashSet::new(),
            attempted: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::new(channel, Duration::from_secs(5));

        let report = dispatcher.dispatch(&[], &message()).await;
        assert_eq!(report.attempted, 0);
        assert!(report.all_succeeded());
    }

    /// A hung delivery becomes a per-recipient failure, not a stuck job.
    #[tokio::test(start_paused = true)]
    async fn test_hung_delivery_times_out() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(HangingChannel), Duration::from_secs(5));

        let recipients = vec![user("a@x.com"), user("b@x.com")];
        let report = dispatcher.dispatch(&recipients, &message()).await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[0].error.contains("timed out"));
    }
}
