//! Ticket-commented fan-out job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tickethub_core::events::TicketEvent;
use tickethub_core::result::AppResult;
use tickethub_core::types::id::CommentId;
use tickethub_entity::job::Job;
use tickethub_notify::formatter::NotificationFormatter;

use crate::executor::{JobExecutionError, JobHandler};

use super::{outcome, parse_event, settle, FailurePolicy, FanoutContext};

/// Notifies the ticket's conversation: creator, assignee, super-admins,
/// and prior commenters, all minus the comment's author.
pub struct TicketCommentedHandler {
    ctx: Arc<FanoutContext>,
}

impl TicketCommentedHandler {
    /// Create the handler.
    pub fn new(ctx: Arc<FanoutContext>) -> Self {
        Self { ctx }
    }

    async fn fan_out(&self, comment_id: CommentId) -> AppResult<Value> {
        let bundle = self.ctx.store.load_comment(comment_id).await?;
        let recipients = self.ctx.resolver.ticket_commented(&bundle).await?;

        tracing::info!(
            ticket = %bundle.ticket.ticket.code,
            commenter = %bundle.author.email,
            recipients = recipients.len(),
            "Resolved ticket-commented recipients"
        );

        let message = NotificationFormatter::ticket_commented(&bundle);
        let report = self
            .ctx
            .dispatcher
            .dispatch(recipients.as_slice(), &message)
            .await;

        Ok(outcome(recipients.len(), &report))
    }
}

#[async_trait]
impl JobHandler for TicketCommentedHandler {
    fn job_type(&self) -> &str {
        "ticket_commented"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let TicketEvent::Commented { comment_id } = parse_event(job)? else {
            return Err(JobExecutionError::Permanent(format!(
                "Unexpected event payload for '{}'",
                job.job_type
            )));
        };

        match self.fan_out(comment_id).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => settle(FailurePolicy::Swallow, job, e),
        }
    }
}
