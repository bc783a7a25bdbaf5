//! Ticket store repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::id::{CommentId, TechnicianId, TicketId};
use tickethub_entity::building::{Building, Device};
use tickethub_entity::technician::Technician;
use tickethub_entity::ticket::{CommentBundle, Ticket, TicketBundle, TicketComment};
use tickethub_entity::traits::TicketStore;
use tickethub_entity::user::User;

/// Repository for loading tickets and comments with their relations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_technician(&self, id: Uuid) -> AppResult<Option<Technician>> {
        sqlx::query_as::<_, Technician>("SELECT * FROM technicians WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find technician", e))
    }

    async fn find_building(&self, id: Uuid) -> AppResult<Option<Building>> {
        sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find building", e))
    }

    async fn find_device(&self, id: Uuid) -> AppResult<Option<Device>> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find device", e))
    }
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn load_ticket(&self, ticket_id: TicketId) -> AppResult<TicketBundle> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ticket", e))?
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::PayloadLoad,
                    format!("Ticket {ticket_id} not found"),
                )
            })?;

        let creator = self.find_user(ticket.created_by).await?.ok_or_else(|| {
            AppError::new(
                ErrorKind::PayloadLoad,
                format!("Ticket {} has no creator user {}", ticket.id, ticket.created_by),
            )
        })?;

        let assignee = match ticket.assignee_id {
            Some(id) => self.find_technician(id).await?,
            None => None,
        };
        let building = match ticket.building_id {
            Some(id) => self.find_building(id).await?,
            None => None,
        };
        let device = match ticket.device_id {
            Some(id) => self.find_device(id).await?,
            None => None,
        };

        Ok(TicketBundle {
            ticket,
            creator,
            assignee,
            building,
            device,
        })
    }

    async fn load_comment(&self, comment_id: CommentId) -> AppResult<CommentBundle> {
        let comment =
            sqlx::query_as::<_, TicketComment>("SELECT * FROM ticket_comments WHERE id = $1")
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to load comment", e)
                })?
                .ok_or_else(|| {
                    AppError::new(
                        ErrorKind::PayloadLoad,
                        format!("Comment {comment_id} not found"),
                    )
                })?;

        let author = self.find_user(comment.author_id).await?.ok_or_else(|| {
            AppError::new(
                ErrorKind::PayloadLoad,
                format!("Comment {} has no author user {}", comment.id, comment.author_id),
            )
        })?;

        let ticket = self.load_ticket(TicketId::from_uuid(comment.ticket_id)).await?;

        Ok(CommentBundle {
            comment,
            author,
            ticket,
        })
    }

    async fn load_technician(&self, technician_id: TechnicianId) -> AppResult<Technician> {
        self.find_technician(technician_id.into_uuid())
            .await?
            .ok_or_else(|| {
                AppError::new(
                    ErrorKind::PayloadLoad,
                    format!("Technician {technician_id} not found"),
                )
            })
    }
}
