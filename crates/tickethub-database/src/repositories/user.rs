//! User directory repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{BuildingId, TicketId};
use tickethub_entity::technician::Technician;
use tickethub_entity::traits::UserDirectory;
use tickethub_entity::user::{User, UserRole};

/// Repository for user and technician directory lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn users_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE $1 = ANY(roles) ORDER BY created_at ASC, id ASC",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Directory, "Failed to list users by role", e))
    }

    async fn users_by_roles(&self, roles: &[UserRole]) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE roles && $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(roles)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Directory, "Failed to list users by roles", e))
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Directory, "Failed to find user by email", e)
            })
    }

    async fn users_commenting_on_ticket(&self, ticket_id: TicketId) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN ( \
                SELECT author_id, MIN(created_at) AS first_at \
                FROM ticket_comments WHERE ticket_id = $1 GROUP BY author_id \
             ) c ON c.author_id = u.id \
             ORDER BY c.first_at ASC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Directory, "Failed to list ticket commenters", e)
        })
    }

    async fn owners_in_building(&self, building_id: BuildingId) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN owner_profiles o ON o.user_id = u.id \
             WHERE o.building_id = $1 AND $2 = ANY(u.roles) \
             ORDER BY u.created_at ASC, u.id ASC",
        )
        .bind(building_id)
        .bind(UserRole::Owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Directory, "Failed to list building owners", e)
        })
    }

    async fn technicians_by_default_flag(&self, is_default: bool) -> AppResult<Vec<Technician>> {
        sqlx::query_as::<_, Technician>(
            "SELECT * FROM technicians WHERE is_default = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(is_default)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Directory, "Failed to list technicians", e))
    }
}
