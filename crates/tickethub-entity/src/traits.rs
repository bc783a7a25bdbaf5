//! Async collaborator seams over the entity model.
//!
//! The fan-out core reads users, tickets, and queue state exclusively
//! through these traits, so recipient resolution and job execution are
//! testable against in-memory implementations without a live database.
//! The concrete implementations live in `tickethub-database`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tickethub_core::result::AppResult;
use tickethub_core::types::id::{CommentId, JobId, TicketId};

use crate::job::{CreateJob, Job, JobStatus};
use crate::notification::Notification;
use crate::technician::Technician;
use crate::ticket::{CommentBundle, TicketBundle};
use crate::user::{User, UserRole};

/// Read access to the user/role directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All users holding the given role.
    async fn users_by_role(&self, role: UserRole) -> AppResult<Vec<User>>;

    /// All users holding any of the given roles, each user once.
    async fn users_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>>;

    /// The user with the given email (case-insensitive), if any.
    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Distinct users who have commented on the given ticket, ordered by
    /// their earliest comment.
    async fn users_commenting_on_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<User>>;

    /// Owner-role users whose owner profile is linked to the given
    /// building.
    async fn owners_in_building(
        &self,
        building_id: tickethub_core::types::id::BuildingId,
    ) -> AppResult<Vec<User>>;

    /// Technician profiles filtered by the default (floating) flag.
    async fn technicians_by_default_flag(&self, is_default: bool) -> AppResult<Vec<Technician>>;
}

/// Read access to tickets and comments with their relations.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Load a ticket with creator, assignee, building, and device.
    ///
    /// A missing ticket is a [`PayloadLoad`] error: the event referenced an
    /// entity the store no longer has.
    ///
    /// [`PayloadLoad`]: tickethub_core::error::ErrorKind::PayloadLoad
    async fn load_ticket(&self, ticket_id: TicketId) -> AppResult<TicketBundle>;

    /// Load a comment with its author and full ticket context.
    async fn load_comment(&self, comment_id: CommentId) -> AppResult<CommentBundle>;

    /// Load a technician profile. Missing is a [`PayloadLoad`] error for
    /// the same reason as a missing ticket.
    ///
    /// [`PayloadLoad`]: tickethub_core::error::ErrorKind::PayloadLoad
    async fn load_technician(
        &self,
        technician_id: tickethub_core::types::id::TechnicianId,
    ) -> AppResult<Technician>;
}

/// Write access to the in-app notification inbox.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist one notification row.
    async fn insert(&self, notification: &Notification) -> AppResult<()>;

    /// Delete notifications created before the cutoff. Returns rows removed.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Trim each user's inbox to the newest `max_per_user` rows. Returns
    /// rows removed.
    async fn trim_per_user(&self, max_per_user: i64) -> AppResult<u64>;
}

/// Persistence for the background job queue.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new pending job.
    async fn create(&self, job: &CreateJob) -> AppResult<Job>;

    /// Atomically claim the next pending job on a queue for a worker.
    async fn claim_next(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>>;

    /// Mark a job completed with an optional result document.
    async fn mark_completed(&self, job_id: JobId, result: Option<serde_json::Value>)
        -> AppResult<()>;

    /// Mark a job failed with an error message.
    async fn mark_failed(&self, job_id: JobId, error: &str) -> AppResult<()>;

    /// Reset a failed job to pending for another attempt.
    async fn retry(&self, job_id: JobId) -> AppResult<()>;

    /// Count jobs in the given status.
    async fn count_by_status(&self, status: JobStatus) -> AppResult<i64>;

    /// Delete terminal jobs last updated before the cutoff. Returns rows
    /// removed.
    async fn delete_terminal_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
