use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::repository::SupportStore;
use wayfare_core::support::{SupportTicket, TicketStatus};

pub struct PgSupportStore {
    pool: PgPool,
}

impl PgSupportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    user_id: Uuid,
    subject: String,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TicketRow {
    fn into_ticket(self, op: &'static str) -> StoreResult<SupportTicket> {
        let status = TicketStatus::parse(&self.status).ok_or_else(|| {
            StoreError::corrupt(op, format!("unknown ticket status '{}'", self.status))
        })?;
        Ok(SupportTicket {
            id: self.id,
            user_id: self.user_id,
            subject: self.subject,
            message: self.message,
            status,
            created_at: self.created_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, subject, message, status, created_at";

#[async_trait]
impl SupportStore for PgSupportStore {
    async fn create(&self, ticket: &SupportTicket) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO support_tickets (id, user_id, subject, message, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(ticket.status.as_str())
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("create support ticket", e))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<SupportTicket>> {
        let row = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {COLUMNS} FROM support_tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get support ticket by id", e))?;
        row.map(|r| r.into_ticket("get support ticket by id"))
            .transpose()
    }

    async fn update(&self, ticket: &SupportTicket) -> StoreResult<()> {
        sqlx::query(
            "UPDATE support_tickets SET subject = $2, message = $3, status = $4 WHERE id = $1",
        )
        .bind(ticket.id)
        .bind(&ticket.subject)
        .bind(&ticket.message)
        .bind(ticket.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("update support ticket", e))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("delete support ticket", e))?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<SupportTicket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {COLUMNS} FROM support_tickets ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list support tickets", e))?;
        rows.into_iter()
            .map(|r| r.into_ticket("list support tickets"))
            .collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<SupportTicket>> {
        let rows = sqlx::query_as::<_, TicketRow>(&format!(
            "SELECT {COLUMNS} FROM support_tickets WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list support tickets by user", e))?;
        rows.into_iter()
            .map(|r| r.into_ticket("list support tickets by user"))
            .collect()
    }
}
