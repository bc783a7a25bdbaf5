//! Ticket-assigned fan-out job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tickethub_core::events::TicketEvent;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{TechnicianId, TicketId, UserId};
use tickethub_entity::job::Job;
use tickethub_notify::formatter::NotificationFormatter;

use crate::executor::{JobExecutionError, JobHandler};

use super::{outcome, parse_event, settle, FailurePolicy, FanoutContext};

/// Notifies the assignee, the creator, and super-admins minus the
/// assigner.
pub struct TicketAssignedHandler {
    ctx: Arc<FanoutContext>,
}

impl TicketAssignedHandler {
    /// Create the handler.
    pub fn new(ctx: Arc<FanoutContext>) -> Self {
        Self { ctx }
    }

    async fn fan_out(
        &self,
        ticket_id: TicketId,
        technician_id: TechnicianId,
        assigned_by: UserId,
    ) -> AppResult<Value> {
        let bundle = self.ctx.store.load_ticket(ticket_id).await?;
        // The event's technician, not the bundle's: a re-assignment racing
        // this job must not change who this notice is about.
        let assignee = self.ctx.store.load_technician(technician_id).await?;

        let recipients = self
            .ctx
            .resolver
            .ticket_assigned(&bundle, &assignee, assigned_by.into_uuid())
            .await?;

        tracing::info!(
            ticket = %bundle.ticket.code,
            assignee = %assignee.email,
            recipients = recipients.len(),
            "Resolved ticket-assigned recipients"
        );

        let message =
            NotificationFormatter::ticket_assigned(&bundle, &assignee, assigned_by.into_uuid());
        let report = self
            .ctx
            .dispatcher
            .dispatch(recipients.as_slice(), &message)
            .await;

        Ok(outcome(recipients.len(), &report))
    }
}

#[async_trait]
impl JobHandler for TicketAssignedHandler {
    fn job_type(&self) -> &str {
        "ticket_assigned"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let TicketEvent::Assigned {
            ticket_id,
            technician_id,
            assigned_by,
        } = parse_event(job)?
        else {
            return Err(JobExecutionError::Permanent(format!(
                "Unexpected event payload for '{}'",
                job.job_type
            )));
        };

        match self.fan_out(ticket_id, technician_id, assigned_by).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => settle(FailurePolicy::Swallow, job, e),
        }
    }
}
