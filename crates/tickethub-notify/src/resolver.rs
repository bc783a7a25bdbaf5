//! Recipient-set computation for ticket events.
//!
//! Each event kind has its own inclusion/exclusion rules; all of them
//! accumulate recipients in a fixed role-group order and dedupe by email
//! through [`RecipientSet`]. A lookup that returns nobody contributes
//! nothing; a lookup that errors propagates to the calling job.

use std::sync::Arc;

use uuid::Uuid;

use tickethub_core::result::AppResult;
use tickethub_core::types::id::{BuildingId, TicketId};
use tickethub_entity::technician::Technician;
use tickethub_entity::ticket::{CommentBundle, TicketBundle};
use tickethub_entity::traits::UserDirectory;
use tickethub_entity::user::UserRole;

use crate::recipients::RecipientSet;

/// The status-transition string that triggers owner notification.
///
/// The upstream application emits this literal even though the canonical
/// status enum spells completion `resolved`/`closed`, so owners are in
/// practice only notified when the upstream sends exactly `"completed"`.
/// The vocabulary is owned upstream; do not "fix" this here.
pub const OWNER_NOTIFY_STATUS: &str = "completed";

/// Computes the ordered, deduplicated recipient set for each event kind.
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn UserDirectory>,
}

impl RecipientResolver {
    /// Create a resolver over the given user directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Recipients of the general ticket-created broadcast.
    ///
    /// Order: creator, super-admins, all technical-role users, then owners
    /// of the ticket's building. The creator caused the event but is
    /// deliberately included.
    pub async fn ticket_created(&self, bundle: &TicketBundle) -> AppResult<RecipientSet> {
        let mut set = RecipientSet::new();

        set.push(bundle.creator.clone());
        set.extend(self.directory.users_by_role(UserRole::SuperAdmin).await?);
        set.extend(self.directory.users_by_role(UserRole::Technical).await?);

        if let Some(building) = &bundle.building {
            set.extend(
                self.directory
                    .owners_in_building(BuildingId::from_uuid(building.id))
                    .await?,
            );
        }

        Ok(set)
    }

    /// Recipients of the immediate admin alert for a new ticket.
    ///
    /// Targets only admins (super-admin and admin roles) plus the users
    /// matching each default technician's email. Runs alongside
    /// [`ticket_created`] for the same event.
    ///
    /// [`ticket_created`]: Self::ticket_created
    pub async fn ticket_created_admin_alert(
        &self,
        _bundle: &TicketBundle,
    ) -> AppResult<RecipientSet> {
        let mut set = RecipientSet::new();

        set.extend(
            self.directory
                .users_by_roles(&[UserRole::SuperAdmin, UserRole::Admin])
                .await?,
        );

        for technician in self.directory.technicians_by_default_flag(true).await? {
            if let Some(user) = self.directory.user_by_email(&technician.email).await? {
                set.push(user);
            }
        }

        Ok(set)
    }

    /// Recipients of a ticket-assigned notice.
    ///
    /// Order: the user matching the assignee's email, the creator, then
    /// super-admins minus the assigner. The assignee is never excluded
    /// from their own assignment notice.
    pub async fn ticket_assigned(
        &self,
        bundle: &TicketBundle,
        assignee: &Technician,
        assigned_by: Uuid,
    ) -> AppResult<RecipientSet> {
        let mut set = RecipientSet::new();

        if let Some(user) = self.directory.user_by_email(&assignee.email).await? {
            set.push(user);
        }

        set.push(bundle.creator.clone());

        for user in self.directory.users_by_role(UserRole::SuperAdmin).await? {
            if user.id != assigned_by {
                set.push(user);
            }
        }

        Ok(set)
    }

    /// Recipients of a new-comment notice.
    ///
    /// Order: creator, assignee's user, super-admins, prior commenters —
    /// each group excluding the comment's author by id.
    pub async fn ticket_commented(&self, bundle: &CommentBundle) -> AppResult<RecipientSet> {
        let commenter = bundle.author.id;
        let mut set = RecipientSet::new();

        if bundle.ticket.creator.id != commenter {
            set.push(bundle.ticket.creator.clone());
        }

        if let Some(user) = self.assignee_user(&bundle.ticket).await? {
            if user.id != commenter {
                set.push(user);
            }
        }

        for user in self.directory.users_by_role(UserRole::SuperAdmin).await? {
            if user.id != commenter {
                set.push(user);
            }
        }

        let ticket_id = TicketId::from_uuid(bundle.ticket.ticket.id);
        for user in self.directory.users_commenting_on_ticket(ticket_id).await? {
            if user.id != commenter {
                set.push(user);
            }
        }

        Ok(set)
    }

    /// Recipients of a status-change notice.
    ///
    /// Order: creator, assignee's user, super-admins; when the transition
    /// string equals [`OWNER_NOTIFY_STATUS`] and the ticket has a building,
    /// that building's owners as well. The status-changer is not excluded.
    pub async fn ticket_status_changed(
        &self,
        bundle: &TicketBundle,
        new_status: &str,
    ) -> AppResult<RecipientSet> {
        let mut set = RecipientSet::new();

        set.push(bundle.creator.clone());

        if let Some(user) = self.assignee_user(bundle).await? {
            set.push(user);
        }

        set.extend(self.directory.users_by_role(UserRole::SuperAdmin).await?);

        if new_status == OWNER_NOTIFY_STATUS {
            if let Some(building) = &bundle.building {
                set.extend(
                    self.directory
                        .owners_in_building(BuildingId::from_uuid(building.id))
                        .await?,
                );
            }
        }

        Ok(set)
    }

    /// The user sharing the assigned technician's email, if both exist.
    ///
    /// Technician and user records are only ever bridged by email
    /// equality; a technician with no matching user contributes nothing.
    async fn assignee_user(
        &self,
        bundle: &TicketBundle,
    ) -> AppResult<Option<tickethub_entity::user::User>> {
        match &bundle.assignee {
            Some(technician) => self.directory.user_by_email(&technician.email).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;

    use tickethub_core::error::AppError;
    use tickethub_entity::building::Building;
    use tickethub_entity::ticket::{Ticket, TicketComment, TicketStatus};
    use tickethub_entity::user::User;

    /// In-memory directory fixture.
    #[derive(Default)]
    struct MemoryDirectory {
        users: Vec<User>,
        technicians: Vec<Technician>,
        /// building id -> owner user ids
        owners: HashMap<Uuid, Vec<Uuid>>,
        /// ticket id -> commenter user ids, earliest-first
        commenters: HashMap<Uuid, Vec<Uuid>>,
        fail_role_lookups: bool,
    }

    impl MemoryDirectory {
        fn users_by_ids(&self, ids: &[Uuid]) -> Vec<User> {
            ids.iter()
                .filter_map(|id| self.users.iter().find(|u| u.id == *id).cloned())
                .collect()
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryDirectory {
        async fn users_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
            if self.fail_role_lookups {
                return Err(AppError::directory("role lookup unavailable"));
            }
            Ok(self
                .users
                .iter()
                .filter(|u| u.roles.contains(&role))
                .cloned()
                .collect())
        }

        async fn users_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
            if self.fail_role_lookups {
                return Err(AppError::directory("role lookup unavailable"));
            }
            Ok(self
                .users
                .iter()
                .filter(|u| u.roles.iter().any(|r| roles.contains(r)))
                .cloned()
                .collect())
        }

        async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
            Ok(self
                .users
                .iter()
                .find(|u| u.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn users_commenting_on_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<User>> {
            Ok(self
                .commenters
                .get(ticket_id.as_uuid())
                .map(|ids| self.users_by_ids(ids))
                .unwrap_or_default())
        }

        async fn owners_in_building(&self, building_id: BuildingId) -> AppResult<Vec<User>> {
            Ok(self
                .owners
                .get(building_id.as_uuid())
                .map(|ids| self.users_by_ids(ids))
                .unwrap_or_default())
        }

        async fn technicians_by_default_flag(
            &self,
            is_default: bool,
        ) -> AppResult<Vec<Technician>> {
            Ok(self
                .technicians
                .iter()
                .filter(|t| t.is_default == is_default)
                .cloned()
                .collect())
        }
    }

    fn user(email: &str, roles: &[UserRole], notifications: Option<bool>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: email.split('@').next().unwrap_or(email).to_string(),
            email_notifications: notifications,
            roles: roles.to_vec(),
            created_at: Utc::now(),
        }
    }

    fn technician(email: &str, is_default: bool) -> Technician {
        Technician {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: email.to_string(),
            is_default,
            created_at: Utc::now(),
        }
    }

    fn ticket_bundle(creator: &User, building: Option<&Building>) -> TicketBundle {
        TicketBundle {
            ticket: Ticket {
                id: Uuid::new_v4(),
                code: "TCK-1".to_string(),
                created_by: creator.id,
                assignee_id: None,
                building_id: building.map(|b| b.id),
                device_id: None,
                status: TicketStatus::Open,
                category: "electrical".to_string(),
                priority: "normal".to_string(),
                created_at: Utc::now(),
            },
            creator: creator.clone(),
            assignee: None,
            building: building.cloned(),
            device: None,
        }
    }

    fn building(name: &str) -> Building {
        Building {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: None,
        }
    }

    fn emails(set: &RecipientSet) -> Vec<String> {
        set.as_slice().iter().map(|u| u.email.clone()).collect()
    }

    /// Creator, super-admin, technical, and building owner in
    /// role-group order.
    #[tokio::test]
    async fn test_created_broadcast_order() {
        let b = building("B");
        let u1 = user("a@x.com", &[UserRole::Tenant], Some(true));
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let t1 = user("t@x.com", &[UserRole::Technical], None);
        let o1 = user("o@x.com", &[UserRole::Owner], Some(true));

        let mut dir = MemoryDirectory::default();
        dir.owners.insert(b.id, vec![o1.id]);
        dir.users = vec![u1.clone(), a1, t1, o1];

        let bundle = ticket_bundle(&u1, Some(&b));
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created(&bundle).await.unwrap();

        assert_eq!(emails(&set), ["a@x.com", "s@x.com", "t@x.com", "o@x.com"]);
    }

    /// An opted-out owner disappears from the set.
    #[tokio::test]
    async fn test_created_broadcast_honors_opt_out() {
        let b = building("B");
        let u1 = user("a@x.com", &[UserRole::Tenant], Some(true));
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let t1 = user("t@x.com", &[UserRole::Technical], None);
        let o1 = user("o@x.com", &[UserRole::Owner], Some(false));

        let mut dir = MemoryDirectory::default();
        dir.owners.insert(b.id, vec![o1.id]);
        dir.users = vec![u1.clone(), a1, t1, o1];

        let bundle = ticket_bundle(&u1, Some(&b));
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created(&bundle).await.unwrap();

        assert_eq!(emails(&set), ["a@x.com", "s@x.com", "t@x.com"]);
    }

    /// A ticket with no building skips the owner rule silently.
    #[tokio::test]
    async fn test_created_broadcast_without_building() {
        let u1 = user("a@x.com", &[UserRole::Tenant], None);
        let mut dir = MemoryDirectory::default();
        dir.users = vec![u1.clone()];

        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created(&bundle).await.unwrap();

        assert_eq!(emails(&set), ["a@x.com"]);
    }

    /// A creator who is also a super-admin appears once.
    #[tokio::test]
    async fn test_created_broadcast_dedupes_by_email() {
        let u1 = user("boss@x.com", &[UserRole::SuperAdmin], None);
        let mut dir = MemoryDirectory::default();
        dir.users = vec![u1.clone()];

        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created(&bundle).await.unwrap();

        assert_eq!(set.len(), 1);
    }

    /// Identical payload and directory state resolve identically.
    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let b = building("B");
        let u1 = user("a@x.com", &[UserRole::Tenant], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let o1 = user("o@x.com", &[UserRole::Owner], None);

        let mut dir = MemoryDirectory::default();
        dir.owners.insert(b.id, vec![o1.id]);
        dir.users = vec![u1.clone(), a1, o1];

        let bundle = ticket_bundle(&u1, Some(&b));
        let resolver = RecipientResolver::new(Arc::new(dir));

        let first = emails(&resolver.ticket_created(&bundle).await.unwrap());
        let second = emails(&resolver.ticket_created(&bundle).await.unwrap());
        assert_eq!(first, second);
    }

    /// A directory failure propagates instead of yielding a partial set.
    #[tokio::test]
    async fn test_directory_error_propagates() {
        let u1 = user("a@x.com", &[UserRole::Tenant], None);
        let dir = MemoryDirectory {
            users: vec![u1.clone()],
            fail_role_lookups: true,
            ..Default::default()
        };

        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let err = resolver.ticket_created(&bundle).await.unwrap_err();
        assert_eq!(err.kind, tickethub_core::error::ErrorKind::Directory);
    }

    /// Admin alert targets admins and the default technician's user only.
    #[tokio::test]
    async fn test_admin_alert_recipients() {
        let u1 = user("a@x.com", &[UserRole::Tenant], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let a2 = user("admin@x.com", &[UserRole::Admin], None);
        let techie = user("default@x.com", &[UserRole::Technical], None);

        let mut dir = MemoryDirectory::default();
        dir.users = vec![u1.clone(), a1, a2, techie];
        dir.technicians = vec![
            technician("default@x.com", true),
            technician("floater@x.com", false),
        ];

        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created_admin_alert(&bundle).await.unwrap();

        assert_eq!(emails(&set), ["s@x.com", "admin@x.com", "default@x.com"]);
    }

    /// A default technician with no matching user contributes nothing.
    #[tokio::test]
    async fn test_admin_alert_skips_unmatched_technician() {
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let creator = user("a@x.com", &[UserRole::Tenant], None);

        let mut dir = MemoryDirectory::default();
        dir.users = vec![a1, creator.clone()];
        dir.technicians = vec![technician("ghost@x.com", true)];

        let bundle = ticket_bundle(&creator, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver.ticket_created_admin_alert(&bundle).await.unwrap();

        assert_eq!(emails(&set), ["s@x.com"]);
    }

    /// Assignee and creator notified; the assigning
    /// super-admin is excluded even though their role matches.
    #[tokio::test]
    async fn test_assigned_excludes_assigner() {
        let tu = user("tech@x.com", &[UserRole::Technical], Some(true));
        let u1 = user("a@x.com", &[UserRole::Tenant], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], Some(true));

        let mut dir = MemoryDirectory::default();
        dir.users = vec![tu.clone(), u1.clone(), a1.clone()];

        let assignee = technician("tech@x.com", false);
        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver
            .ticket_assigned(&bundle, &assignee, a1.id)
            .await
            .unwrap();

        assert_eq!(emails(&set), ["tech@x.com", "a@x.com"]);
    }

    /// An assignee who assigned the ticket to themself still gets their
    /// own assignment notice.
    #[tokio::test]
    async fn test_self_assignment_still_notifies_assignee() {
        let tu = user("tech@x.com", &[UserRole::Technical], None);
        let u1 = user("a@x.com", &[UserRole::Tenant], None);

        let mut dir = MemoryDirectory::default();
        dir.users = vec![tu.clone(), u1.clone()];

        let assignee = technician("tech@x.com", false);
        let bundle = ticket_bundle(&u1, None);
        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver
            .ticket_assigned(&bundle, &assignee, tu.id)
            .await
            .unwrap();

        assert_eq!(emails(&set), ["tech@x.com", "a@x.com"]);
    }

    fn comment_bundle(
        ticket: TicketBundle,
        author: &User,
    ) -> CommentBundle {
        CommentBundle {
            comment: TicketComment {
                id: Uuid::new_v4(),
                ticket_id: ticket.ticket.id,
                author_id: author.id,
                body: "any update?".to_string(),
                created_at: Utc::now(),
            },
            author: author.clone(),
            ticket,
        }
    }

    /// Creator, assignee, super-admin, and prior commenter are
    /// notified; the commenter is excluded from every group.
    #[tokio::test]
    async fn test_commented_recipients() {
        let c1 = user("c1@x.com", &[UserRole::Tenant], None);
        let u1 = user("u1@x.com", &[UserRole::Tenant], None);
        let tu = user("tu@x.com", &[UserRole::Technical], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let c2 = user("c2@x.com", &[UserRole::Tenant], None);

        let mut dir = MemoryDirectory::default();
        dir.users = vec![c1.clone(), u1.clone(), tu.clone(), a1, c2.clone()];

        let mut bundle = ticket_bundle(&u1, None);
        let assignee = technician("tu@x.com", false);
        bundle.ticket.assignee_id = Some(assignee.id);
        bundle.assignee = Some(assignee);
        dir.commenters
            .insert(bundle.ticket.id, vec![c2.id, c1.id]);

        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver
            .ticket_commented(&comment_bundle(bundle, &c1))
            .await
            .unwrap();

        assert_eq!(emails(&set), ["u1@x.com", "tu@x.com", "s@x.com", "c2@x.com"]);
    }

    /// A commenter who is also super-admin and the ticket creator
    /// never receives their own comment.
    #[tokio::test]
    async fn test_commenter_never_notified_of_own_comment() {
        let c1 = user("c1@x.com", &[UserRole::SuperAdmin], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);

        let mut dir = MemoryDirectory::default();
        dir.users = vec![c1.clone(), a1];

        let bundle = ticket_bundle(&c1, None);
        dir.commenters.insert(bundle.ticket.id, vec![c1.id]);

        let resolver = RecipientResolver::new(Arc::new(dir));
        let set = resolver
            .ticket_commented(&comment_bundle(bundle, &c1))
            .await
            .unwrap();

        assert_eq!(emails(&set), ["s@x.com"]);
    }

    /// Owners are notified on the literal `"completed"`
    /// transition and on no other spelling of completion.
    #[tokio::test]
    async fn test_status_change_owner_trigger_literal() {
        let b = building("B");
        let u1 = user("u1@x.com", &[UserRole::Tenant], None);
        let tu = user("tu@x.com", &[UserRole::Technical], None);
        let a1 = user("s@x.com", &[UserRole::SuperAdmin], None);
        let o1 = user("o@x.com", &[UserRole::Owner], None);

        let mut dir = MemoryDirectory::default();
        dir.owners.insert(b.id, vec![o1.id]);
        dir.users = vec![u1.clone(), tu.clone(), a1, o1];

        let mut bundle = ticket_bundle(&u1, Some(&b));
        let assignee = technician("tu@x.com", false);
        bundle.ticket.assignee_id = Some(assignee.id);
        bundle.assignee = Some(assignee);

        let resolver = RecipientResolver::new(Arc::new(dir));

        let completed = resolver
            .ticket_status_changed(&bundle, "completed")
            .await
            .unwrap();
        assert_eq!(
            emails(&completed),
            ["u1@x.com", "tu@x.com", "s@x.com", "o@x.com"]
        );

        // The canonical enum's own completion spelling does not trigger
        // the owner rule.
        let resolved = resolver
            .ticket_status_changed(&bundle, "resolved")
            .await
            .unwrap();
        assert_eq!(emails(&resolved), ["u1@x.com", "tu@x.com", "s@x.com"]);
    }

    /// An opted-out user appears in no resolved set, whatever their
    /// role memberships.
    #[tokio::test]
    async fn test_opted_out_user_never_resolved() {
        let quiet = user(
            "quiet@x.com",
            &[UserRole::SuperAdmin, UserRole::Technical, UserRole::Owner],
            Some(false),
        );
        let u1 = user("u1@x.com", &[UserRole::Tenant], None);
        let b = building("B");

        let mut dir = MemoryDirectory::default();
        dir.owners.insert(b.id, vec![quiet.id]);
        dir.users = vec![quiet.clone(), u1.clone()];
        dir.technicians = vec![technician("quiet@x.com", true)];

        let bundle = ticket_bundle(&u1, Some(&b));
        let resolver = RecipientResolver::new(Arc::new(dir));

        let broadcast = resolver.ticket_created(&bundle).await.unwrap();
        assert_eq!(emails(&broadcast), ["u1@x.com"]);

        let alert = resolver.ticket_created_admin_alert(&bundle).await.unwrap();
        assert!(alert.is_empty());

        let status = resolver
            .ticket_status_changed(&bundle, "completed")
            .await
            .unwrap();
        assert_eq!(emails(&status), ["u1@x.com"]);
    }
}
