//! Deferred enqueue of ticket events.
//!
//! The upstream request handler must never wait on notification work.
//! [`DeferredScheduler::schedule`] hands the event to a detached task and
//! returns immediately; the enqueue happens after the caller has moved
//! on, and an enqueue failure is logged, never surfaced. Callers that
//! already run after their response is flushed (response-finished hooks)
//! can use [`DeferredScheduler::enqueue_now`] and observe the result.

use std::sync::Arc;

use uuid::Uuid;

use tickethub_core::error::AppError;
use tickethub_core::events::TicketEvent;
use tickethub_entity::job::{Job, JobPriority};

use crate::queue::{JobCreateParams, JobQueue};

/// Queue carrying the admin-alert jobs.
pub const ALERTS_QUEUE: &str = "alerts";
/// Queue carrying all other fan-out jobs.
pub const NOTIFICATIONS_QUEUE: &str = "notifications";

/// Schedules ticket events for asynchronous fan-out.
#[derive(Clone)]
pub struct DeferredScheduler {
    queue: Arc<JobQueue>,
}

impl DeferredScheduler {
    /// Create a scheduler over the given job queue.
    pub fn new(queue: Arc<JobQueue>) -> Self {
        Self { queue }
    }

    /// Fire-and-forget: enqueue the event from a detached task.
    ///
    /// Returns before the enqueue happens; the calling request path is
    /// never blocked and never sees an enqueue failure. Events scheduled
    /// in sequence land on their queue in FIFO order per call site only
    /// as far as task scheduling allows, which is acceptable: each event
    /// computes an independent recipient set.
    pub fn schedule(&self, event: TicketEvent) {
        let queue = Arc::clone(&self.queue);
        let params = Self::plan(&event);

        tokio::spawn(async move {
            match params {
                Ok(params) => {
                    if let Err(e) = queue.enqueue(params).await {
                        tracing::error!(
                            job_type = event.job_type(),
                            ticket_id = ?event.ticket_id(),
                            error = %e,
                            "Failed to enqueue deferred ticket event"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(
                        job_type = event.job_type(),
                        error = %e,
                        "Failed to serialize ticket event"
                    );
                }
            }
        });
    }

    /// Enqueue the event and wait for the queue write.
    ///
    /// For call sites that already run post-response and want the job id
    /// or the error.
    pub async fn enqueue_now(&self, event: TicketEvent) -> Result<Job, AppError> {
        self.queue.enqueue(Self::plan(&event)?).await
    }

    /// Map an event onto its queue, priority, and retry budget.
    ///
    /// Only the admin-alert path gets retries: its failure mode
    /// (lookup errors before any dispatch) is safe to re-run, and
    /// ticket-creation alerts to admins are worth the second try. Every
    /// other kind is best-effort, one attempt.
    fn plan(event: &TicketEvent) -> Result<JobCreateParams, AppError> {
        let payload = serde_json::to_value(event)?;

        let (queue, priority, max_attempts) = match event {
            TicketEvent::CreatedAdminAlert { .. } => (ALERTS_QUEUE, JobPriority::High, 3),
            _ => (NOTIFICATIONS_QUEUE, JobPriority::Normal, 1),
        };

        Ok(JobCreateParams {
            job_type: event.job_type().to_string(),
            queue: queue.to_string(),
            priority,
            payload,
            max_attempts,
            created_by: Self::actor(event),
        })
    }

    fn actor(event: &TicketEvent) -> Option<Uuid> {
        match event {
            TicketEvent::Assigned { assigned_by, .. } => Some(assigned_by.into_uuid()),
            TicketEvent::StatusChanged { changed_by, .. } => changed_by.map(|id| id.into_uuid()),
            _ => None,
        }
    }
}
