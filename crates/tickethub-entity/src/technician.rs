//! Technician profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A technical-staff profile.
///
/// A technician may or may not correspond to a platform [`User`]; the only
/// bridge between the two is email equality, never a foreign key.
///
/// [`User`]: crate::user::User
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Technician {
    /// Unique technician identifier.
    pub id: Uuid,
    /// Contact email; matched against user emails for notification routing.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Floating technician eligible for all unassigned-ticket alerts.
    pub is_default: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
