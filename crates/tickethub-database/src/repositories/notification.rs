//! In-app notification repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::notification::Notification;
use tickethub_entity::traits::NotificationStore;

/// Repository for the in-app notification inbox.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, notification: &Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, user_id, kind, title, body, payload, actor_id, ticket_id, \
              is_read, is_dismissed, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.kind)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.payload)
        .bind(notification.actor_id)
        .bind(notification.ticket_id)
        .bind(notification.is_read)
        .bind(notification.is_dismissed)
        .bind(notification.created_at)
        .bind(notification.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert notification", e)
        })?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications \
             WHERE created_at < $1 OR (expires_at IS NOT NULL AND expires_at <= NOW())",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete expired notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn trim_per_user(&self, max_per_user: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE id IN ( \
                SELECT id FROM ( \
                    SELECT id, ROW_NUMBER() OVER ( \
                        PARTITION BY user_id ORDER BY created_at DESC \
                    ) AS rn FROM notifications \
                ) ranked WHERE ranked.rn > $1 \
             )",
        )
        .bind(max_per_user)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to trim notifications", e)
        })?;
        Ok(result.rows_affected())
    }
}
