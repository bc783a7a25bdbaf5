//! Ordered, deduplicated recipient accumulation.

use std::collections::HashSet;

use tickethub_entity::user::User;

/// An ordered recipient collection, deduplicated by email.
///
/// Dedup is case-insensitive and first-occurrence-wins: the user object
/// appended first under a given email is the one that receives the
/// notification. Users who opted out of notifications are rejected at
/// insert, so a set never contains one.
#[derive(Debug, Default)]
pub struct RecipientSet {
    users: Vec<User>,
    seen: HashSet<String>,
}

impl RecipientSet {
    /// Create an empty recipient set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user unless they opted out or their email is already
    /// present. Returns whether the user was added.
    pub fn push(&mut self, user: User) -> bool {
        if !user.wants_notifications() {
            tracing::debug!(user_id = %user.id, email = %user.email, "Recipient opted out, skipping");
            return false;
        }

        let key = user.email.to_lowercase();
        if !self.seen.insert(key) {
            tracing::debug!(user_id = %user.id, email = %user.email, "Recipient already present, skipping");
            return false;
        }

        tracing::debug!(user_id = %user.id, email = %user.email, "Recipient included");
        self.users.push(user);
        true
    }

    /// Append every user in order, applying the same rules as [`push`].
    ///
    /// [`push`]: Self::push
    pub fn extend(&mut self, users: impl IntoIterator<Item = User>) {
        for user in users {
            self.push(user);
        }
    }

    /// Number of recipients.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The recipients in insertion order.
    pub fn as_slice(&self) -> &[User] {
        &self.users
    }

    /// Consume the set, yielding the ordered recipients.
    pub fn into_vec(self) -> Vec<User> {
        self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tickethub_entity::user::UserRole;
    use uuid::Uuid;

    fn user(email: &str, notifications: Option<bool>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: email.to_string(),
            email_notifications: notifications,
            roles: vec![UserRole::Tenant],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let first = user("a@x.com", None);
        let second = user("a@x.com", None);
        let first_id = first.id;

        let mut set = RecipientSet::new();
        assert!(set.push(first));
        assert!(!set.push(second));

        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].id, first_id);
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let mut set = RecipientSet::new();
        assert!(set.push(user("Admin@X.com", None)));
        assert!(!set.push(user("admin@x.com", None)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_opted_out_users_are_rejected() {
        let mut set = RecipientSet::new();
        assert!(!set.push(user("quiet@x.com", Some(false))));
        assert!(set.is_empty());
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut set = RecipientSet::new();
        set.extend([user("a@x.com", None), user("b@x.com", None), user("c@x.com", None)]);
        let emails: Vec<_> = set.into_vec().into_iter().map(|u| u.email).collect();
        assert_eq!(emails, ["a@x.com", "b@x.com", "c@x.com"]);
    }
}
