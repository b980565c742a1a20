//! Bookmark repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::collect_page;
use crate::db::DbError;
use crate::models::{BookmarkKind, Paginated, Pagination};

/// Bookmark with the target's current title, if the target still exists
/// and the owner of the bookmark may still see it
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub target_kind: String,
    pub target_id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Bookmark repository
pub struct BookmarkRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BookmarkRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Flip the bookmark on a target. Returns whether it is now bookmarked.
    pub async fn toggle(
        &self,
        user_id: Uuid,
        kind: BookmarkKind,
        target_id: Uuid,
    ) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM bookmarks WHERE user_id = $1 AND target_kind = $2 AND target_id = $3",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            tracing::debug!(%user_id, kind = kind.as_str(), %target_id, "bookmark removed");
            return Ok(false);
        }

        let mut visible = sqlx::query_scalar::<_, bool>(visible_target_sql(kind)).bind(target_id);
        if kind == BookmarkKind::Resume {
            visible = visible.bind(user_id);
        }
        if !visible.fetch_one(&mut *tx).await? {
            return Err(DbError::not_found(kind.as_str(), target_id));
        }

        sqlx::query(
            "INSERT INTO bookmarks (user_id, target_kind, target_id) VALUES ($1, $2, $3)
             ON CONFLICT (user_id, target_kind, target_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(%user_id, kind = kind.as_str(), %target_id, "bookmark added");
        Ok(true)
    }

    /// The caller's bookmarks, newest first, optionally of one kind.
    pub async fn list(
        &self,
        user_id: Uuid,
        kind: Option<BookmarkKind>,
        page: Pagination,
    ) -> Result<Paginated<Bookmark>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.target_kind, b.target_id, b.created_at,
                   COALESCE(j.title, t.title, r.title, r.name, l.title, p.title) AS title,
                   COUNT(*) OVER() AS total
            FROM bookmarks b
            LEFT JOIN jobs j
                ON b.target_kind = 'job' AND j.id = b.target_id AND NOT j.is_hidden
            LEFT JOIN transfers t
                ON b.target_kind = 'transfer' AND t.id = b.target_id AND NOT t.is_hidden
            LEFT JOIN detailed_resumes r
                ON b.target_kind = 'resume' AND r.id = b.target_id
                AND (r.is_public OR r.user_id = b.user_id)
            LEFT JOIN lectures l ON b.target_kind = 'lecture' AND l.id = b.target_id
            LEFT JOIN forum_posts p
                ON b.target_kind = 'forum_post' AND p.id = b.target_id AND NOT p.is_hidden
            WHERE b.user_id = $1 AND ($2::TEXT IS NULL OR b.target_kind = $2)
            ORDER BY b.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(kind.map(|k| k.as_str()))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        collect_page(rows, page, || async move {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM bookmarks b
                 WHERE b.user_id = $1 AND ($2::TEXT IS NULL OR b.target_kind = $2)",
            )
            .bind(user_id)
            .bind(kind.map(|k| k.as_str()))
            .fetch_one(self.pool)
            .await
        })
        .await
    }
}

/// Existence check for a bookmark target the caller may see. Résumés bind
/// the caller as `$2`: private ones are visible to their owner only.
fn visible_target_sql(kind: BookmarkKind) -> &'static str {
    match kind {
        BookmarkKind::Job => "SELECT EXISTS (SELECT 1 FROM jobs WHERE id = $1 AND NOT is_hidden)",
        BookmarkKind::Transfer => {
            "SELECT EXISTS (SELECT 1 FROM transfers WHERE id = $1 AND NOT is_hidden)"
        }
        BookmarkKind::ForumPost => {
            "SELECT EXISTS (SELECT 1 FROM forum_posts WHERE id = $1 AND NOT is_hidden)"
        }
        BookmarkKind::Lecture => "SELECT EXISTS (SELECT 1 FROM lectures WHERE id = $1)",
        BookmarkKind::Resume => {
            "SELECT EXISTS (SELECT 1 FROM detailed_resumes \
             WHERE id = $1 AND (is_public OR user_id = $2))"
        }
    }
}
