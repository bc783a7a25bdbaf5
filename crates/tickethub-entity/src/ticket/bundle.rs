//! Fully loaded ticket context for one job execution.

use serde::{Deserialize, Serialize};

use crate::building::{Building, Device};
use crate::technician::Technician;
use crate::ticket::comment::TicketComment;
use crate::ticket::model::Ticket;
use crate::user::User;

/// A ticket with the relations recipient resolution and rendering read.
///
/// Loaded once at job start and immutable for the duration of that
/// execution; a payload sitting in the queue never goes stale because the
/// bundle is re-read at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBundle {
    /// The ticket itself.
    pub ticket: Ticket,
    /// The user who filed the ticket. Always present.
    pub creator: User,
    /// The assigned technician, if the ticket is routed.
    pub assignee: Option<Technician>,
    /// The ticket's building, if any.
    pub building: Option<Building>,
    /// The device the ticket was filed against, if any.
    pub device: Option<Device>,
}

/// A comment with its author and the full ticket context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentBundle {
    /// The comment.
    pub comment: TicketComment,
    /// The comment's author.
    pub author: User,
    /// The commented ticket, fully loaded.
    pub ticket: TicketBundle,
}
