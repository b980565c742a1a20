//! Lecture (video course) repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{collect_page, contains_pattern};
use crate::db::DbError;
use crate::models::{LectureDraft, LectureFilter, Paginated, Pagination};

const LECTURE_COLUMNS: &str = "l.id, l.title, l.instructor, l.category, l.description, \
     l.video_url, l.thumbnail_url, l.duration_seconds, l.view_count, l.created_at";

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: Uuid,
    pub title: String,
    pub instructor: String,
    pub category: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Lecture repository
pub struct LectureRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LectureRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &LectureFilter,
        page: Pagination,
    ) -> Result<Paginated<Lecture>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {LECTURE_COLUMNS}, COUNT(*) OVER() AS total FROM lectures l WHERE TRUE"
        ));

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

    async fn count(&self, filter: &LectureFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM lectures l WHERE TRUE");
        push_filters(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }

    /// Lecture by id. Counts as a view.
    pub async fn view(&self, id: Uuid) -> Result<Lecture, DbError> {
        sqlx::query_as::<_, Lecture>(&format!(
            "UPDATE lectures l SET view_count = l.view_count + 1
             WHERE l.id = $1
             RETURNING {LECTURE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("lecture", id))
    }

    pub async fn create(&self, draft: &LectureDraft) -> Result<Lecture, DbError> {
        let lecture = sqlx::query_as::<_, Lecture>(&format!(
            "INSERT INTO lectures AS l (title, instructor, category, description, video_url,
                                        thumbnail_url, duration_seconds)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {LECTURE_COLUMNS}"
        ))
        .bind(draft.title.as_str())
        .bind(&draft.instructor)
        .bind(&draft.category)
        .bind(draft.description.as_deref())
        .bind(&draft.video_url)
        .bind(draft.thumbnail_url.as_deref())
        .bind(draft.duration_seconds)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(lecture_id = %lecture.id, "lecture created");
        Ok(lecture)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM lectures WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("lecture", id));
        }
        tracing::info!(lecture_id = %id, "lecture deleted");
        Ok(())
    }
}

/// WHERE conditions shared by the lectures page and its count.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &LectureFilter) {
    if let Some(category) = &filter.category {
        qb.push(" AND l.category = ").push_bind(category.clone());
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (l.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.instructor ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::users::test_support::test_pool;
    use crate::models::{LectureForm, LectureSort};

    #[tokio::test]
    #[ignore = "requires database"]
    async fn popular_sort_puts_most_viewed_first() {
        let pool = test_pool().await;
        let repo = LectureRepo::new(&pool);
        let category = format!("test-{}", Uuid::new_v4().simple());

        let mut ids = Vec::new();
        for title in ["덜 본 강의", "많이 본 강의"] {
            let draft = LectureForm {
                title: title.into(),
                instructor: "이강사".into(),
                category: category.clone(),
                video_url: "https://video.example.kr/1".into(),
                ..Default::default()
            }
            .validate()
            .unwrap();
            ids.push(repo.create(&draft).await.unwrap().id);
        }
        repo.view(ids[1]).await.unwrap();

        let filter = LectureFilter {
            category: Some(category),
            keyword: None,
            sort: LectureSort::Popular,
        };
        let page = repo.list(&filter, Pagination::default()).await.unwrap();
        assert_eq!(page.items[0].id, ids[1]);
    }
}
