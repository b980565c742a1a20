//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; constructed per request
//! - List queries return the page and `COUNT(*) OVER()` total together;
//!   an empty page past the end falls back to a plain count
//! - Ownership is part of the WHERE clause, not a separate read
//! - Multi-statement writes run in one transaction

pub mod users;
pub mod resumes;
pub mod jobs;
pub mod applications;
pub mod transfers;
pub mod forum;
pub mod lectures;
pub mod messages;
pub mod bookmarks;
pub mod stats;
pub mod moderation;

pub use users::{User, UserRepo};
pub use resumes::{PublicResumeSummary, Resume, ResumeRepo};
pub use jobs::{Job, JobRepo};
pub use applications::{Application, ApplicationRepo, ApplicationWithJob};
pub use transfers::{Transfer, TransferRepo};
pub use forum::{Comment, ForumPost, ForumRepo};
pub use lectures::{Lecture, LectureRepo};
pub use messages::{Message, MessageRepo};
pub use bookmarks::{Bookmark, BookmarkRepo};
pub use stats::{SiteStats, StatsRepo};
pub use moderation::ModerationRepo;

use std::future::Future;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::DbError;
use crate::models::{Paginated, Pagination};

/// Build a `%keyword%` ILIKE pattern with LIKE metacharacters escaped.
pub(crate) fn contains_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Turn rows carrying a `total` window column into a page.
///
/// A page past the end has no rows to read the total from, so `recount`
/// runs the same filters as a plain `COUNT(*)`.
pub(crate) async fn collect_page<T, F, Fut>(
    rows: Vec<PgRow>,
    page: Pagination,
    recount: F,
) -> Result<Paginated<T>, DbError>
where
    T: for<'r> FromRow<'r, PgRow>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<i64, sqlx::Error>>,
{
    let total = match rows.first() {
        Some(row) => row.try_get::<i64, _>("total")?,
        None if page.offset() > 0 => recount().await?,
        None => 0,
    };
    let items = rows
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(page.wrap(items, total))
}

/// After an owner-scoped UPDATE/DELETE touched nothing, tell "missing"
/// apart from "not yours".
pub(crate) async fn ownership_miss(
    pool: &PgPool,
    table: &'static str,
    owner_column: &'static str,
    resource: &'static str,
    id: Uuid,
) -> DbError {
    let sql = format!("SELECT {owner_column} FROM {table} WHERE id = $1");
    match sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
    {
        Ok(Some(_)) => DbError::Forbidden(format!("{resource} belongs to another user")),
        Ok(None) => DbError::not_found(resource, id),
        Err(e) => DbError::Sqlx(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_like_metacharacters() {
        assert_eq!(contains_pattern("수의사"), "%수의사%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
