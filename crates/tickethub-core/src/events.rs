//! Ticket events emitted by the upstream web application.
//!
//! Events travel as the JSON payload of a queued job. They carry entity
//! identifiers and status strings only; the executing job reloads the full
//! entity bundle from the data store, so a payload never goes stale while
//! it waits in the queue.

use serde::{Deserialize, Serialize};

use crate::types::id::{CommentId, TechnicianId, TicketId, UserId};

/// A ticket lifecycle event to fan out notifications for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A ticket was created (general broadcast path).
    Created {
        /// The new ticket.
        ticket_id: TicketId,
    },
    /// A ticket was created (admin/default-technician alert path).
    ///
    /// Runs alongside [`TicketEvent::Created`] for the same ticket; this is
    /// the stricter immediate-alert channel and the only event kind whose
    /// job is retried on lookup failure.
    CreatedAdminAlert {
        /// The new ticket.
        ticket_id: TicketId,
    },
    /// A ticket was assigned to a technician.
    Assigned {
        /// The ticket.
        ticket_id: TicketId,
        /// The technician the ticket was assigned to.
        technician_id: TechnicianId,
        /// The user who performed the assignment.
        assigned_by: UserId,
    },
    /// A comment was added to a ticket.
    Commented {
        /// The new comment.
        comment_id: CommentId,
    },
    /// A ticket's status changed.
    StatusChanged {
        /// The ticket.
        ticket_id: TicketId,
        /// The previous status, as the upstream application spells it.
        old_status: String,
        /// The new status, as the upstream application spells it.
        new_status: String,
        /// The user who changed the status, when known.
        changed_by: Option<UserId>,
    },
}

impl TicketEvent {
    /// The job type string this event is queued under.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => "ticket_created",
            Self::CreatedAdminAlert { .. } => "ticket_created_admin_alert",
            Self::Assigned { .. } => "ticket_assigned",
            Self::Commented { .. } => "ticket_commented",
            Self::StatusChanged { .. } => "ticket_status_changed",
        }
    }

    /// The ticket this event refers to, when carried directly.
    ///
    /// `Commented` carries only a comment id; the ticket is resolved when
    /// the comment is loaded.
    pub fn ticket_id(&self) -> Option<TicketId> {
        match self {
            Self::Created { ticket_id }
            | Self::CreatedAdminAlert { ticket_id }
            | Self::Assigned { ticket_id, .. }
            | Self::StatusChanged { ticket_id, .. } => Some(*ticket_id),
            Self::Commented { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        let event = TicketEvent::Assigned {
            ticket_id: TicketId::new(),
            technician_id: TechnicianId::new(),
            assigned_by: UserId::new(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "assigned");
        let parsed: TicketEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_job_type_mapping() {
        let event = TicketEvent::Created {
            ticket_id: TicketId::new(),
        };
        assert_eq!(event.job_type(), "ticket_created");

        let alert = TicketEvent::CreatedAdminAlert {
            ticket_id: TicketId::new(),
        };
        assert_eq!(alert.job_type(), "ticket_created_admin_alert");
    }
}
