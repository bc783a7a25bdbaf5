//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The event kind a notification was rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A ticket was created (general broadcast).
    TicketCreated,
    /// A ticket was created (admin/default-technician alert).
    TicketCreatedAdminAlert,
    /// A ticket was assigned to a technician.
    TicketAssigned,
    /// A comment was added to a ticket.
    TicketCommented,
    /// A ticket's status changed.
    TicketStatusChanged,
}

impl NotificationKind {
    /// Return the kind as its canonical snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketCreated => "ticket_created",
            Self::TicketCreatedAdminAlert => "ticket_created_admin_alert",
            Self::TicketAssigned => "ticket_assigned",
            Self::TicketCommented => "ticket_commented",
            Self::TicketStatusChanged => "ticket_status_changed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
