// src/db/ticket_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ticket::{
        CreateTicketPayload, Message, Ticket, TicketPriority, TicketStatus, UpdateTicketPayload,
    },
};

#[derive(Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_tickets(
        &self,
        status: Option<TicketStatus>,
        customer_id: Option<Uuid>,
    ) -> Result<Vec<Ticket>, AppError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT * FROM tickets
            WHERE ($1::ticket_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    pub async fn find_ticket<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Ticket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(ticket)
    }

    /// Trava o ticket: mensagens concorrentes aplicam a transição uma de cada vez.
    pub async fn lock_ticket<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Ticket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(ticket)
    }

    pub async fn create_ticket<'e, E>(
        &self,
        executor: E,
        ticket_no: &str,
        customer_id: Uuid,
        created_by: Uuid,
        payload: &CreateTicketPayload,
    ) -> Result<Ticket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (ticket_no, customer_id, site_id, title, description, priority, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(ticket_no)
        .bind(customer_id)
        .bind(payload.site_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.priority.unwrap_or(TicketPriority::Medium))
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn update_ticket<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &UpdateTicketPayload,
    ) -> Result<Option<Ticket>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                site_id = COALESCE($5, site_id),
                assigned_to = COALESCE($6, assigned_to),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.priority)
        .bind(changes.site_id)
        .bind(changes.assigned_to)
        .fetch_optional(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: TicketStatus) -> Result<Ticket, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ticket = sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(ticket)
    }

    pub async fn delete_ticket<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MENSAGENS
    // =========================================================================

    pub async fn list_messages(&self, ticket_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE ticket_id = $1 ORDER BY created_at ASC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn insert_message<'e, E>(
        &self,
        executor: E,
        ticket_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<Message, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (ticket_id, sender_id, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(ticket_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(executor)
        .await?;
        Ok(message)
    }

    pub async fn delete_messages_of<'e, E>(&self, executor: E, ticket_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM messages WHERE ticket_id = $1")
            .bind(ticket_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
