//! Ticket status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical lifecycle status of a maintenance ticket.
///
/// Status *transitions* travel through job payloads as plain strings, and
/// the upstream application also emits transition values outside this enum
/// (notably `"completed"`); consumers that care about transitions compare
/// the raw strings instead of parsing into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly filed, not yet picked up.
    Open,
    /// A technician is working the ticket.
    InProgress,
    /// Work finished, awaiting confirmation.
    Resolved,
    /// Confirmed and archived.
    Closed,
}

impl TicketStatus {
    /// Whether the ticket is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = tickethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(tickethub_core::AppError::validation(format!(
                "Invalid ticket status: '{s}'. Expected one of: open, in_progress, resolved, closed"
            ))),
        }
    }
}
