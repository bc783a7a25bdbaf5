//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a user can hold in the ticketing platform.
///
/// A user may hold more than one role; recipient rules select users by
/// role membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    /// Full platform administrator.
    SuperAdmin,
    /// Building/portfolio administrator.
    Admin,
    /// Technical staff member.
    Technical,
    /// Apartment/unit owner.
    Owner,
    /// Tenant living in a unit.
    Tenant,
    /// Building doorman.
    Doorman,
}

impl UserRole {
    /// Return the role as its canonical kebab-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::Admin => "admin",
            Self::Technical => "technical",
            Self::Owner => "owner",
            Self::Tenant => "tenant",
            Self::Doorman => "doorman",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = tickethub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "super-admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "technical" => Ok(Self::Technical),
            "owner" => Ok(Self::Owner),
            "tenant" => Ok(Self::Tenant),
            "doorman" => Ok(Self::Doorman),
            _ => Err(tickethub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: super-admin, admin, technical, owner, tenant, doorman"
            ))),
        }
    }
}
