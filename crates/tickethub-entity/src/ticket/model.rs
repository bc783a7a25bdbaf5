//! Ticket entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::TicketStatus;

/// A maintenance ticket filed against a device in a building/apartment.
///
/// A ticket always has a creator; assignee, building, and device are
/// optional and every consumer guards on their presence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: Uuid,
    /// Human-facing ticket code (e.g. `"TCK-2031"`).
    pub code: String,
    /// The user who filed the ticket.
    pub created_by: Uuid,
    /// The technician the ticket is assigned to, if routed.
    pub assignee_id: Option<Uuid>,
    /// The building the ticket belongs to, if known.
    pub building_id: Option<Uuid>,
    /// The device the ticket was filed against, if any.
    pub device_id: Option<Uuid>,
    /// Current status.
    pub status: TicketStatus,
    /// Free-form category (e.g. `"plumbing"`).
    pub category: String,
    /// Free-form priority (e.g. `"high"`).
    pub priority: String,
    /// When the ticket was filed.
    pub created_at: DateTime<Utc>,
}
