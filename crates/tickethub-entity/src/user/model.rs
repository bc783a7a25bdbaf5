//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user in the ticketing platform.
///
/// `email` is the user's delivery address and the identity recipient sets
/// deduplicate on: two user records sharing an email collapse to one
/// notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address (unique within any recipient set).
    pub email: String,
    /// Human-readable display name.
    pub name: String,
    /// Email notification preference. Unset counts as opted in; an
    /// explicit `false` is the only suppression mechanism.
    pub email_notifications: Option<bool>,
    /// Roles held by the user.
    pub roles: Vec<UserRole>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user accepts notifications.
    pub fn wants_notifications(&self) -> bool {
        self.email_notifications.unwrap_or(true)
    }

    /// Whether the user holds the given role.
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email_notifications: Option<bool>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            email_notifications,
            roles: vec![UserRole::Tenant],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unset_preference_counts_as_opted_in() {
        assert!(user(None).wants_notifications());
        assert!(user(Some(true)).wants_notifications());
        assert!(!user(Some(false)).wants_notifications());
    }

    #[test]
    fn test_has_role() {
        let u = user(None);
        assert!(u.has_role(UserRole::Tenant));
        assert!(!u.has_role(UserRole::SuperAdmin));
    }
}
