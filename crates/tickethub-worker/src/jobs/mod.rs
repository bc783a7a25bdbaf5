//! Job handlers for ticket event fan-out and queue maintenance.

pub mod cleanup;
pub mod ticket_assigned;
pub mod ticket_commented;
pub mod ticket_created;
pub mod ticket_status_changed;

use std::sync::Arc;

use serde_json::Value;

use tickethub_core::error::AppError;
use tickethub_core::events::TicketEvent;
use tickethub_entity::job::Job;
use tickethub_entity::traits::TicketStore;
use tickethub_notify::dispatcher::DispatchReport;
use tickethub_notify::{NotificationDispatcher, RecipientResolver};

use crate::executor::JobExecutionError;

/// Shared collaborators of every fan-out job handler.
pub struct FanoutContext {
    /// Ticket/comment loading.
    pub store: Arc<dyn TicketStore>,
    /// Recipient-set computation.
    pub resolver: RecipientResolver,
    /// Per-recipient delivery.
    pub dispatcher: NotificationDispatcher,
}

impl FanoutContext {
    /// Bundle the fan-out collaborators.
    pub fn new(
        store: Arc<dyn TicketStore>,
        resolver: RecipientResolver,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
        }
    }
}

/// What a handler does with a failure that precedes any dispatch.
///
/// Per-recipient delivery failures never reach this decision; only
/// payload-load and directory-lookup errors do. The asymmetry between the
/// two variants is deliberate and per event kind: re-running is only safe
/// when the failure happened before any notification went out, and only
/// the admin-alert path is considered worth the retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log with full context and complete the job. Terminal; best-effort
    /// notification kinds use this.
    Swallow,
    /// Log with full context and surface a transient failure so the queue
    /// retries while attempts remain.
    Escalate,
}

/// Deserialize the job payload back into a ticket event.
pub(crate) fn parse_event(job: &Job) -> Result<TicketEvent, JobExecutionError> {
    serde_json::from_value(job.payload.clone())
        .map_err(|e| JobExecutionError::Permanent(format!("Malformed event payload: {e}")))
}

/// The JSON outcome report stored on the completed job row.
pub(crate) fn outcome(recipients: usize, report: &DispatchReport) -> Value {
    serde_json::json!({
        "recipients": recipients,
        "attempted": report.attempted,
        "succeeded": report.succeeded,
        "failed": report.failed.len(),
    })
}

/// Apply the event kind's failure policy to a pre-dispatch error.
pub(crate) fn settle(
    policy: FailurePolicy,
    job: &Job,
    err: AppError,
) -> Result<Option<Value>, JobExecutionError> {
    tracing::error!(
        job_id = %job.id,
        job_type = %job.job_type,
        payload = %job.payload,
        error = %err,
        "Fan-out failed before dispatch"
    );

    match policy {
        FailurePolicy::Swallow => Ok(Some(serde_json::json!({
            "skipped": true,
            "error": err.to_string(),
        }))),
        FailurePolicy::Escalate => Err(JobExecutionError::Transient(err.to_string())),
    }
}
