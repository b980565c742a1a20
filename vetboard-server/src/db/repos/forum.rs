//! Forum repository: posts, comments, and their counters
//!
//! `comment_count` is denormalised onto the post and kept in step with
//! `forum_comments` by doing both writes in one transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{collect_page, contains_pattern, ownership_miss};
use crate::db::DbError;
use crate::models::{CommentContent, ForumFilter, Paginated, Pagination, PostDraft};

const POST_SELECT: &str = "SELECT p.id, p.author_id, u.name AS author_name, p.category, p.title, \
     p.content, p.is_hidden, p.view_count, p.comment_count, p.created_at, p.updated_at \
     FROM forum_posts p JOIN users u ON u.id = p.author_id";

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.author_id, u.name AS author_name, \
     c.content, c.created_at \
     FROM forum_comments c JOIN users u ON u.id = c.author_id";

/// Forum post with its author's display name
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub category: String,
    pub title: String,
    pub content: String,
    pub is_hidden: bool,
    pub view_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Forum repository
pub struct ForumRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ForumRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &ForumFilter,
        page: Pagination,
    ) -> Result<Paginated<ForumPost>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT p.id, p.author_id, u.name AS author_name, p.category, p.title, p.content, \
             p.is_hidden, p.view_count, p.comment_count, p.created_at, p.updated_at, \
             COUNT(*) OVER() AS total \
             FROM forum_posts p JOIN users u ON u.id = p.author_id \
             WHERE NOT p.is_hidden",
        );

        push_filters(&mut qb, filter);

        qb.push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(self.pool).await?;
        collect_page(rows, page, || self.count(filter)).await
    }

    async fn count(&self, filter: &ForumFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM forum_posts p WHERE NOT p.is_hidden",
        );
        push_filters(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ForumPost, DbError> {
        sqlx::query_as::<_, ForumPost>(&format!(
            "{POST_SELECT} WHERE p.id = $1 AND NOT p.is_hidden"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("post", id))
    }

    /// Bump the view counter and return the new value.
    pub async fn increment_view(&self, id: Uuid) -> Result<i64, DbError> {
        sqlx::query_scalar(
            "UPDATE forum_posts SET view_count = view_count + 1
             WHERE id = $1 AND NOT is_hidden
             RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("post", id))
    }

    pub async fn create(&self, author_id: Uuid, draft: &PostDraft) -> Result<ForumPost, DbError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO forum_posts (author_id, category, title, content)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(author_id)
        .bind(draft.category.as_str())
        .bind(draft.title.as_str())
        .bind(draft.content.as_str())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(post_id = %id, %author_id, category = draft.category.as_str(), "forum post created");
        self.get(id).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        author_id: Uuid,
        draft: &PostDraft,
    ) -> Result<ForumPost, DbError> {
        let result = sqlx::query(
            "UPDATE forum_posts SET category = $3, title = $4, content = $5, updated_at = NOW()
             WHERE id = $1 AND author_id = $2",
        )
        .bind(id)
        .bind(author_id)
        .bind(draft.category.as_str())
        .bind(draft.title.as_str())
        .bind(draft.content.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ownership_miss(self.pool, "forum_posts", "author_id", "post", id).await);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid, author_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM forum_posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ownership_miss(self.pool, "forum_posts", "author_id", "post", id).await);
        }
        Ok(())
    }

    /// Comments on a post, oldest first.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DbError> {
        let visible: Option<bool> =
            sqlx::query_scalar("SELECT NOT is_hidden FROM forum_posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(self.pool)
                .await?;
        if visible != Some(true) {
            return Err(DbError::not_found("post", post_id));
        }

        let comments = sqlx::query_as::<_, Comment>(&format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &CommentContent,
    ) -> Result<Comment, DbError> {
        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            "UPDATE forum_posts SET comment_count = comment_count + 1
             WHERE id = $1 AND NOT is_hidden",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
        if bumped.rows_affected() == 0 {
            return Err(DbError::not_found("post", post_id));
        }

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO forum_comments (post_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let comment = sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, id: Uuid, author_id: Uuid) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        let post_id: Option<Uuid> = sqlx::query_scalar(
            "DELETE FROM forum_comments WHERE id = $1 AND author_id = $2 RETURNING post_id",
        )
        .bind(id)
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(post_id) = post_id else {
            drop(tx);
            return Err(
                ownership_miss(self.pool, "forum_comments", "author_id", "comment", id).await,
            );
        };

        sqlx::query(
            "UPDATE forum_posts SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1",
        )
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// WHERE conditions shared by the posts page and its count.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ForumFilter) {
    if let Some(category) = &filter.category {
        qb.push(" AND p.category = ").push_bind(category.as_str());
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::users::test_support::{insert_user, test_pool};
    use crate::models::{PostForm, Role};

    fn draft() -> PostDraft {
        PostForm {
            category: "clinical".into(),
            title: "고양이 신부전 케이스 공유".into(),
            content: "최근 내원한 케이스입니다.".into(),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn view_counter_is_monotonic() {
        let pool = test_pool().await;
        let author = insert_user(&pool, Role::User).await;
        let repo = ForumRepo::new(&pool);
        let post = repo.create(author.id, &draft()).await.unwrap();

        let mut last = post.view_count;
        for _ in 0..3 {
            let next = repo.increment_view(post.id).await.unwrap();
            assert_eq!(next, last + 1);
            last = next;
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn comment_count_tracks_comments() {
        let pool = test_pool().await;
        let author = insert_user(&pool, Role::User).await;
        let commenter = insert_user(&pool, Role::User).await;
        let repo = ForumRepo::new(&pool);
        let post = repo.create(author.id, &draft()).await.unwrap();

        let first = repo
            .add_comment(post.id, commenter.id, &CommentContent::new("좋은 정보 감사합니다").unwrap())
            .await
            .unwrap();
        repo.add_comment(post.id, author.id, &CommentContent::new("감사합니다").unwrap())
            .await
            .unwrap();
        assert_eq!(repo.get(post.id).await.unwrap().comment_count, 2);

        let err = repo.delete_comment(first.id, author.id).await.unwrap_err();
        assert!(matches!(err, DbError::Forbidden(_)));

        repo.delete_comment(first.id, commenter.id).await.unwrap();
        assert_eq!(repo.get(post.id).await.unwrap().comment_count, 1);

        let comments = repo.list_comments(post.id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author_id, author.id);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_post_view_is_not_found() {
        let pool = test_pool().await;
        let err = ForumRepo::new(&pool)
            .increment_view(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
