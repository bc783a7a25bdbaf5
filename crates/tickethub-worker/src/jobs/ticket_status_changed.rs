//! Ticket-status-changed fan-out job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tickethub_core::events::TicketEvent;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TicketId, UserId};
use tickethub_entity::job::Job;
use tickethub_notify::formatter::NotificationFormatter;

use crate::executor::{JobExecutionError, JobHandler};

use super::{outcome, parse_event, settle, FailurePolicy, FanoutContext};

/// Notifies creator, assignee, and super-admins of a status change, plus
/// building owners on the `"completed"` transition.
pub struct TicketStatusChangedHandler {
    ctx: Arc<FanoutContext>,
}

impl TicketStatusChangedHandler {
    /// Create the handler.
    pub fn new(ctx: Arc<FanoutContext>) -> Self {
        Self { ctx }
    }

    async fn fan_out(
        &self,
        ticket_id: TicketId,
        old_status: &str,
        new_status: &str,
        changed_by: Option<UserId>,
    ) -> AppResult<Value> {
        let bundle = self.ctx.store.load_ticket(ticket_id).await?;
        let recipients = self
            .ctx
            .resolver
            .ticket_status_changed(&bundle, new_status)
            .await?;

        tracing::info!(
            ticket = %bundle.ticket.code,
            old_status = old_status,
            new_status = new_status,
            recipients = recipients.len(),
            "Resolved ticket-status-changed recipients"
        );

        let message = NotificationFormatter::ticket_status_changed(
            &bundle,
            old_status,
            new_status,
            changed_by.map(UserId::into_uuid),
        );
        let report = self
            .ctx
            .dispatcher
            .dispatch(recipients.as_slice(), &message)
            .await;

        Ok(outcome(recipients.len(), &report))
    }
}

#[async_trait]
impl JobHandler for TicketStatusChangedHandler {
    fn job_type(&self) -> &str {
        "ticket_status_changed"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let TicketEvent::StatusChanged {
            ticket_id,
            old_status,
            new_status,
            changed_by,
        } = parse_event(job)?
        else {
            return Err(JobExecutionError::Permanent(format!(
                "Unexpected event payload for '{}'",
                job.job_type
            )));
        };

        match self
            .fan_out(ticket_id, &old_status, &new_status, changed_by)
            .await
        {
            Ok(result) => Ok(Some(result)),
            Err(e) => settle(FailurePolicy::Swallow, job, e),
        }
    }
}
