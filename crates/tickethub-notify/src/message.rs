//! Rendered notification content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tickethub_entity::notification::NotificationKind;

/// One rendered notification, ready for delivery to any channel.
///
/// Rendering happens once per event; the same message goes to every
/// recipient of that event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// The event kind this message was rendered for.
    pub kind: NotificationKind,
    /// Subject/title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Structured context for channels that render their own layout.
    pub payload: serde_json::Value,
    /// The ticket the message refers to.
    pub ticket_id: Option<Uuid>,
    /// The user whose action produced the event, when known.
    pub actor_id: Option<Uuid>,
}
