//! Direct message repository
//!
//! Per-user inbox and sent box over a single `messages` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::collect_page;
use crate::db::DbError;
use crate::models::{MessageDraft, Paginated, Pagination};

const MESSAGE_COLUMNS: &str = "m.id, m.sender_id, s.name AS sender_name, m.recipient_id, \
     r.name AS recipient_name, m.subject, m.content, m.read_at, m.created_at";

const MESSAGE_FROM: &str =
    "FROM messages m JOIN users s ON s.id = m.sender_id JOIN users r ON r.id = m.recipient_id";

/// Message record with both parties' display names
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub recipient_id: Uuid,
    pub recipient_name: String,
    pub subject: Option<String>,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Message repository
pub struct MessageRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MessageRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn send(&self, sender_id: Uuid, draft: &MessageDraft) -> Result<Message, DbError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO messages (sender_id, recipient_id, subject, content)
            SELECT $1, u.id, $3, $4 FROM users u WHERE u.id = $2 AND u.is_active
            RETURNING id
            "#,
        )
        .bind(sender_id)
        .bind(draft.recipient_id)
        .bind(draft.subject.as_ref().map(|s| s.as_str()))
        .bind(draft.content.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("recipient", draft.recipient_id))?;

        tracing::info!(message_id = %id, %sender_id, recipient_id = %draft.recipient_id, "message sent");
        self.get(id).await
    }

    /// Messages received, newest first.
    pub async fn inbox(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        page: Pagination,
    ) -> Result<Paginated<Message>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}, COUNT(*) OVER() AS total
            {MESSAGE_FROM}
            WHERE m.recipient_id = $1 AND (NOT $2 OR m.read_at IS NULL)
            ORDER BY m.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(recipient_id)
        .bind(unread_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        collect_page(rows, page, || async move {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM messages m
                 WHERE m.recipient_id = $1 AND (NOT $2 OR m.read_at IS NULL)",
            )
            .bind(recipient_id)
            .bind(unread_only)
            .fetch_one(self.pool)
            .await
        })
        .await
    }

    /// Messages sent, newest first.
    pub async fn sent(
        &self,
        sender_id: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Message>, DbError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}, COUNT(*) OVER() AS total
            {MESSAGE_FROM}
            WHERE m.sender_id = $1
            ORDER BY m.created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(sender_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        collect_page(rows, page, || async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages m WHERE m.sender_id = $1")
                .bind(sender_id)
                .fetch_one(self.pool)
                .await
        })
        .await
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64, DbError> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND read_at IS NULL",
        )
        .bind(recipient_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Mark a received message read. The first read time is kept.
    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<Message, DbError> {
        let result = sqlx::query(
            "UPDATE messages SET read_at = COALESCE(read_at, NOW())
             WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.miss(id).await);
        }
        self.get(id).await
    }

    /// Delete a message. Either party may delete it.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM messages WHERE id = $1 AND (sender_id = $2 OR recipient_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.miss(id).await);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Message, DbError> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {MESSAGE_COLUMNS} {MESSAGE_FROM} WHERE m.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("message", id))
    }

    async fn miss(&self, id: Uuid) -> DbError {
        match sqlx::query_scalar::<_, Uuid>("SELECT id FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
        {
            Ok(Some(_)) => DbError::Forbidden("message belongs to another user".into()),
            Ok(None) => DbError::not_found("message", id),
            Err(e) => DbError::Sqlx(e),
        }
    }
}
