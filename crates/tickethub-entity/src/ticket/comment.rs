//! Ticket comment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A comment on a ticket.
///
/// Prior commenters on a ticket form its "conversation" and are notified
/// of new comments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketComment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The ticket commented on.
    pub ticket_id: Uuid,
    /// The authoring user.
    pub author_id: Uuid,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}
