//! Notification message rendering.

use tickethub_entity::notification::NotificationKind;
use tickethub_entity::technician::Technician;
use tickethub_entity::ticket::{CommentBundle, TicketBundle};
use uuid::Uuid;

use crate::message::NotificationMessage;

/// Renders notification messages for ticket events.
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Renders the general ticket-created broadcast.
    pub fn ticket_created(bundle: &TicketBundle) -> NotificationMessage {
        let place = bundle
            .building
            .as_ref()
            .map(|b| format!(" in {}", b.name))
            .unwrap_or_default();

        NotificationMessage {
            kind: NotificationKind::TicketCreated,
            title: format!("New ticket {}", bundle.ticket.code),
            body: format!(
                "{} filed ticket {} ({}){place}: {} priority",
                bundle.creator.name,
                bundle.ticket.code,
                bundle.ticket.category,
                bundle.ticket.priority,
            ),
            payload: Self::ticket_payload(bundle),
            ticket_id: Some(bundle.ticket.id),
            actor_id: Some(bundle.creator.id),
        }
    }

    /// Renders the immediate admin/default-technician alert for a new
    /// ticket.
    pub fn ticket_created_admin_alert(bundle: &TicketBundle) -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketCreatedAdminAlert,
            title: format!("[Action needed] New ticket {}", bundle.ticket.code),
            body: format!(
                "Unrouted ticket {} ({}) filed by {} awaits triage",
                bundle.ticket.code, bundle.ticket.category, bundle.creator.name,
            ),
            payload: Self::ticket_payload(bundle),
            ticket_id: Some(bundle.ticket.id),
            actor_id: Some(bundle.creator.id),
        }
    }

    /// Renders a ticket-assigned notice.
    pub fn ticket_assigned(
        bundle: &TicketBundle,
        assignee: &Technician,
        assigned_by: Uuid,
    ) -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketAssigned,
            title: format!("Ticket {} assigned", bundle.ticket.code),
            body: format!(
                "Ticket {} was assigned to {}",
                bundle.ticket.code, assignee.name,
            ),
            payload: Self::ticket_payload(bundle),
            ticket_id: Some(bundle.ticket.id),
            actor_id: Some(assigned_by),
        }
    }

    /// Renders a new-comment notice.
    pub fn ticket_commented(bundle: &CommentBundle) -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketCommented,
            title: format!("New comment on {}", bundle.ticket.ticket.code),
            body: format!(
                "{} commented on ticket {}: {}",
                bundle.author.name,
                bundle.ticket.ticket.code,
                truncate(&bundle.comment.body, 140),
            ),
            payload: serde_json::json!({
                "ticket": Self::ticket_payload(&bundle.ticket),
                "comment_id": bundle.comment.id,
            }),
            ticket_id: Some(bundle.ticket.ticket.id),
            actor_id: Some(bundle.author.id),
        }
    }

    /// Renders a status-change notice.
    pub fn ticket_status_changed(
        bundle: &TicketBundle,
        old_status: &str,
        new_status: &str,
        changed_by: Option<Uuid>,
    ) -> NotificationMessage {
        NotificationMessage {
            kind: NotificationKind::TicketStatusChanged,
            title: format!("Ticket {} is now {new_status}", bundle.ticket.code),
            body: format!(
                "Ticket {} moved from {old_status} to {new_status}",
                bundle.ticket.code,
            ),
            payload: serde_json::json!({
                "ticket": Self::ticket_payload(bundle),
                "old_status": old_status,
                "new_status": new_status,
            }),
            ticket_id: Some(bundle.ticket.id),
            actor_id: changed_by,
        }
    }

    fn ticket_payload(bundle: &TicketBundle) -> serde_json::Value {
        serde_json::json!({
            "ticket_id": bundle.ticket.id,
            "code": bundle.ticket.code,
            "category": bundle.ticket.category,
            "priority": bundle.ticket.priority,
            "building": bundle.building.as_ref().map(|b| &b.name),
            "device": bundle.device.as_ref().map(|d| &d.name),
        })
    }
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}…")
    }
}
