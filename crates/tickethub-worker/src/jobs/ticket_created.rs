//! Ticket-created fan-out jobs.
//!
//! Two handlers run for every created ticket: the general broadcast to
//! creator/admins/technicians/owners, and the stricter admin alert to
//! admins and default technicians. They are separate queue entries with
//! different failure policies; only the alert is retried, and only
//! because its failures precede any dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tickethub_core::events::TicketEvent;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::TicketId;
use tickethub_entity::job::Job;
use tickethub_notify::formatter::NotificationFormatter;

use crate::executor::{JobExecutionError, JobHandler};

use super::{outcome, parse_event, settle, FailurePolicy, FanoutContext};

/// General ticket-created broadcast.
pub struct TicketCreatedHandler {
    ctx: Arc<FanoutContext>,
}

impl TicketCreatedHandler {
    /// Create the broadcast handler.
    pub fn new(ctx: Arc<FanoutContext>) -> Self {
        Self { ctx }
    }

    async fn fan_out(&self, ticket_id: TicketId) -> AppResult<Value> {
        let bundle = self.ctx.store.load_ticket(ticket_id).await?;
        let recipients = self.ctx.resolver.ticket_created(&bundle).await?;

        tracing::info!(
            ticket = %bundle.ticket.code,
            recipients = recipients.len(),
            "Resolved ticket-created broadcast recipients"
        );

        let message = NotificationFormatter::ticket_created(&bundle);
        let report = self
            .ctx
            .dispatcher
            .dispatch(recipients.as_slice(), &message)
            .await;

        Ok(outcome(recipients.len(), &report))
    }
}

#[async_trait]
impl JobHandler for TicketCreatedHandler {
    fn job_type(&self) -> &str {
        "ticket_created"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let TicketEvent::Created { ticket_id } = parse_event(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Unexpected event payload for '{}'",
                job.job_type
            )));
        };

        match self.fan_out(ticket_id).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => settle(FailurePolicy::Swallow, job, e),
        }
    }
}

/// Admin/default-technician alert for a created ticket.
pub struct TicketCreatedAdminAlertHandler {
    ctx: Arc<FanoutContext>,
}

impl TicketCreatedAdminAlertHandler {
    /// Create the admin-alert handler.
    pub fn new(ctx: Arc<FanoutContext>) -> Self {
        Self { ctx }
    }

    async fn fan_out(&self, ticket_id: TicketId) -> AppResult<Value> {
        let bundle = self.ctx.store.load_ticket(ticket_id).await?;
        let recipients = self.ctx.resolver.ticket_created_admin_alert(&bundle).await?;

        tracing::info!(
            ticket = %bundle.ticket.code,
            recipients = recipients.len(),
            "Resolved ticket-created admin-alert recipients"
        );

        let message = NotificationFormatter::ticket_created_admin_alert(&bundle);
        let report = self
            .ctx
            .dispatcher
            .dispatch(recipients.as_slice(), &message)
            .await;

        Ok(outcome(recipients.len(), &report))
    }
}

#[async_trait]
impl JobHandler for TicketCreatedAdminAlertHandler {
    fn job_type(&self) -> &str {
        "ticket_created_admin_alert"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let TicketEvent::CreatedAdminAlert { ticket_id } = parse_event(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Unexpected event payload for '{}'",
                job.job_type
            )));
        };

        match self.fan_out(ticket_id).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => settle(FailurePolicy::Escalate, job, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fixtures::*;
    use tickethub_entity::notification::NotificationKind;
    use tickethub_entity::user::UserRole;

    #[tokio::test]
    async fn test_broadcast_delivers_to_all_groups() {
        let creator = user("creator@x.com", &[UserRole::Tenant]);
        let admin = user("admin@x.com", &[UserRole::SuperAdmin]);
        let tech = user("tech@x.com", &[UserRole::Technical]);
        let owner = user("owner@x.com", &[UserRole::Owner]);
        let b = building("B");

        let mut directory = MemoryDirectory::default();
        directory.owners.insert(b.id, vec![owner.id]);
        directory.users = vec![creator.clone(), admin, tech, owner];

        let bundle = bundle(&creator, Some(&b));
        let ticket_id = bundle.ticket.id;
        let mut store = MemoryTicketStore::default();
        store.tickets.insert(ticket_id, bundle);

        let channel = Arc::new(RecordingChannel::default());
        let handler =
            TicketCreatedHandler::new(context(directory, store, Arc::clone(&channel)));

        let job = queued_job(
            "ticket_created",
            serde_json::json!({"type": "created", "ticket_id": ticket_id}),
        );
        let result = handler.execute(&job).await.unwrap().unwrap();

        assert_eq!(result["recipients"], 4);
        assert_eq!(result["succeeded"], 4);

        let deliveries = channel.deliveries.lock().unwrap();
        let emails: Vec<_> = deliveries.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(
            emails,
            ["creator@x.com", "admin@x.com", "tech@x.com", "owner@x.com"]
        );
        assert!(deliveries
            .iter()
            .all(|(_, kind)| *kind == NotificationKind::TicketCreated));
    }

    #[tokio::test]
    async fn test_broadcast_swallows_missing_ticket() {
        let channel = Arc::new(RecordingChannel::default());
        let handler = TicketCreatedHandler::new(context(
            MemoryDirectory::default(),
            MemoryTicketStore::default(),
            Arc::clone(&channel),
        ));

        let job = queued_job(
            "ticket_created",
            serde_json::json!({"type": "created", "ticket_id": uuid::Uuid::new_v4()}),
        );

        // The job completes; the failure is only visible in the outcome.
        let result = handler.execute(&job).await.unwrap().unwrap();
        assert_eq!(result["skipped"], true);
        assert!(channel.deliveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_alert_escalates_missing_ticket() {
        let channel = Arc::new(RecordingChannel::default());
        let handler = TicketCreatedAdminAlertHandler::new(context(
            MemoryDirectory::default(),
            MemoryTicketStore::default(),
            channel,
        ));

        let job = queued_job(
            "ticket_created_admin_alert",
            serde_json::json!({"type": "created_admin_alert", "ticket_id": uuid::Uuid::new_v4()}),
        );

        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Transient(_)));
    }

    #[tokio::test]
    async fn test_admin_alert_happy_path() {
        let creator = user("creator@x.com", &[UserRole::Tenant]);
        let admin = user("admin@x.com", &[UserRole::Admin]);
        let default_tech = user("default@x.com", &[UserRole::Technical]);

        let mut directory = MemoryDirectory::default();
        directory.users = vec![creator.clone(), admin, default_tech];
        directory.technicians = vec![technician("default@x.com", true)];

        let bundle = bundle(&creator, None);
        let ticket_id = bundle.ticket.id;
        let mut store = MemoryTicketStore::default();
        store.tickets.insert(ticket_id, bundle);

        let channel = Arc::new(RecordingChannel::default());
        let handler =
            TicketCreatedAdminAlertHandler::new(context(directory, store, Arc::clone(&channel)));

        let job = queued_job(
            "ticket_created_admin_alert",
            serde_json::json!({"type": "created_admin_alert", "ticket_id": ticket_id}),
        );
        let result = handler.execute(&job).await.unwrap().unwrap();

        assert_eq!(result["recipients"], 2);
        let deliveries = channel.deliveries.lock().unwrap();
        let emails: Vec<_> = deliveries.iter().map(|(e, _)| e.as_str()).collect();
        assert_eq!(emails, ["admin@x.com", "default@x.com"]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_permanent() {
        let channel = Arc::new(RecordingChannel::default());
        let handler = TicketCreatedHandler::new(context(
            MemoryDirectory::default(),
            MemoryTicketStore::default(),
            channel,
        ));

        let job = queued_job("ticket_created", serde_json::json!({"nonsense": 1}));
        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test]
    async fn test_wrong_event_kind_is_permanent() {
        let channel = Arc::new(RecordingChannel::default());
        let handler = TicketCreatedHandler::new(context(
            MemoryDirectory::default(),
            MemoryTicketStore::default(),
            channel,
        ));

        let job = queued_job(
            "ticket_created",
            serde_json::json!({"type": "commented", "comment_id": uuid::Uuid::new_v4()}),
        );
        let err = handler.execute(&job).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }
}
