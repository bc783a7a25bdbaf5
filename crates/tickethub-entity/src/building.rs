//! Building, device, and owner-profile entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A managed building.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Building {
    /// Unique building identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
}

/// A device installed in a building or apartment that tickets are filed
/// against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Unique device identifier.
    pub id: Uuid,
    /// Display name (e.g. "Elevator B", "Boiler 2").
    pub name: String,
    /// The building the device is installed in.
    pub building_id: Option<Uuid>,
}

/// Links an owner-role user to the building they own units in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OwnerProfile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// The building the user owns units in.
    pub building_id: Uuid,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
