//! Job posting repository

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{collect_page, contains_pattern, ownership_miss};
use crate::db::DbError;
use crate::models::{JobDraft, JobFilter, JobStatus, Paginated, Pagination};

const JOB_COLUMNS: &str = "j.id, j.owner_id, j.title, j.hospital_name, j.position, j.work_type, \
     j.region, j.salary_min, j.salary_max, j.description, j.status, j.is_hidden, j.view_count, \
     j.deadline, j.created_at, j.updated_at";

/// Job posting record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub hospital_name: String,
    pub position: String,
    pub work_type: Option<String>,
    pub region: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub status: String,
    pub is_hidden: bool,
    pub view_count: i64,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open.as_str()
    }
}

/// Job posting repository
pub struct JobRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> JobRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List visible postings matching `filter`.
    pub async fn list(
        &self,
        filter: &JobFilter,
        page: Pagination,
    ) -> Result<Paginated<Job>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {JOB_COLUMNS}, COUNT(*) OVER() AS total FROM jobs j WHERE NOT j.is_hidden"
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

    async fn count(&self, filter: &JobFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM jobs j WHERE NOT j.is_hidden",
        );
        push_filters(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }

    /// Visible posting by id. Counts as a view.
    pub async fn view(&self, id: Uuid) -> Result<Job, DbError> {
        sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs j SET view_count = j.view_count + 1
             WHERE j.id = $1 AND NOT j.is_hidden
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("job", id))
    }

    /// Posting by id regardless of visibility, without touching the counter.
    pub async fn get(&self, id: Uuid) -> Result<Job, DbError> {
        sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("job", id))
    }

    pub async fn create(&self, owner_id: Uuid, draft: &JobDraft) -> Result<Job, DbError> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs AS j (owner_id, title, hospital_name, position, work_type, region,
                                    salary_min, salary_max, description, deadline)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(draft.title.as_str())
        .bind(&draft.hospital_name)
        .bind(&draft.position)
        .bind(draft.work_type.as_deref())
        .bind(&draft.region)
        .bind(draft.salary_min)
        .bind(draft.salary_max)
        .bind(draft.description.as_str())
        .bind(draft.deadline)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_constraint(e, "job already exists", "user"))?;

        tracing::info!(job_id = %job.id, %owner_id, "job posted");
        Ok(job)
    }

    /// Replace the editable fields of an owned posting.
    pub async fn update(&self, id: Uuid, owner_id: Uuid, draft: &JobDraft) -> Result<Job, DbError> {
        let updated = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs j SET title = $3, hospital_name = $4, position = $5, work_type = $6,
                    region = $7, salary_min = $8, salary_max = $9, description = $10,
                    deadline = $11, updated_at = NOW()
             WHERE j.id = $1 AND j.owner_id = $2
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .bind(draft.title.as_str())
        .bind(&draft.hospital_name)
        .bind(&draft.position)
        .bind(draft.work_type.as_deref())
        .bind(&draft.region)
        .bind(draft.salary_min)
        .bind(draft.salary_max)
        .bind(draft.description.as_str())
        .bind(draft.deadline)
        .fetch_optional(self.pool)
        .await?;

        match updated {
            Some(job) => Ok(job),
            None => Err(ownership_miss(self.pool, "jobs", "owner_id", "job", id).await),
        }
    }

    /// Close an owned posting. Closing twice is a no-op.
    pub async fn close(&self, id: Uuid, owner_id: Uuid) -> Result<Job, DbError> {
        let closed = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs j SET status = 'closed', updated_at = NOW()
             WHERE j.id = $1 AND j.owner_id = $2
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        match closed {
            Some(job) => {
                tracing::info!(job_id = %id, "job closed");
                Ok(job)
            }
            None => Err(ownership_miss(self.pool, "jobs", "owner_id", "job", id).await),
        }
    }

    pub async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ownership_miss(self.pool, "jobs", "owner_id", "job", id).await);
        }
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }
}

/// WHERE conditions shared by the jobs page and its count.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    if let Some(region) = &filter.region {
        qb.push(" AND j.region = ").push_bind(region.clone());
    }
    if let Some(position) = &filter.position {
        qb.push(" AND j.position = ").push_bind(position.clone());
    }
    if let Some(work_type) = &filter.work_type {
        qb.push(" AND j.work_type = ").push_bind(work_type.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND j.status = ").push_bind(status.as_str());
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.hospital_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::JobForm;

    pub fn draft(title: &str) -> JobDraft {
        JobForm {
            title: title.into(),
            hospital_name: "행복동물병원".into(),
            position: "임상수의사".into(),
            work_type: Some("정규직".into()),
            region: "서울".into(),
            salary_min: Some(4000),
            salary_max: Some(6000),
            description: "진료 및 수술 보조".into(),
            deadline: None,
        }
        .validate()
        .expect("valid job form")
    }
}
