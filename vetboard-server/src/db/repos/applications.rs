//! Job application repository
//!
//! One application per job per applicant, enforced by the
//! `UNIQUE (job_id, applicant_id)` constraint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::DbError;
use crate::models::ApplicationStatus;

const APPLICATION_SELECT: &str = "SELECT a.id, a.job_id, a.applicant_id, u.name AS applicant_name, \
     a.resume_id, a.cover_letter, a.status, a.created_at, a.updated_at \
     FROM applications a JOIN users u ON u.id = a.applicant_id";

/// Application as seen by the job owner
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub applicant_name: String,
    pub resume_id: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application as seen by the applicant, with the posting it targets
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationWithJob {
    pub id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub hospital_name: String,
    pub job_status: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Job application repository
pub struct ApplicationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ApplicationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply to an open, visible job.
    pub async fn apply(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        resume_id: Option<Uuid>,
        cover_letter: Option<&str>,
    ) -> Result<Application, DbError> {
        let mut tx = self.pool.begin().await?;

        let job: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT owner_id, status FROM jobs WHERE id = $1 AND NOT is_hidden FOR SHARE",
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (owner_id, status) = job.ok_or_else(|| DbError::not_found("job", job_id))?;
        if owner_id == applicant_id {
            return Err(DbError::Forbidden("cannot apply to your own job".into()));
        }
        if status != "open" {
            return Err(DbError::Conflict("job is closed".into()));
        }

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO applications (job_id, applicant_id, resume_id, cover_letter)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(job_id)
        .bind(applicant_id)
        .bind(resume_id)
        .bind(cover_letter)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::from_constraint(e, "already applied to this job", "job"))?;

        let application =
            sqlx::query_as::<_, Application>(&format!("{APPLICATION_SELECT} WHERE a.id = $1"))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        tracing::info!(application_id = %id, %job_id, %applicant_id, "application submitted");
        Ok(application)
    }

    /// The caller's applications, newest first.
    pub async fn list_mine(&self, applicant_id: Uuid) -> Result<Vec<ApplicationWithJob>, DbError> {
        let rows = sqlx::query_as::<_, ApplicationWithJob>(
            "SELECT a.id, a.job_id, j.title AS job_title, j.hospital_name, j.status AS job_status,
                    a.status, a.created_at
             FROM applications a JOIN jobs j ON j.id = a.job_id
             WHERE a.applicant_id = $1
             ORDER BY a.created_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Applications for a job, visible to its owner only.
    pub async fn list_for_job(
        &self,
        job_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<Application>, DbError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT owner_id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(self.pool)
            .await?;

        match owner {
            None => return Err(DbError::not_found("job", job_id)),
            Some(o) if o != owner_id => {
                return Err(DbError::Forbidden("job belongs to another user".into()))
            }
            Some(_) => {}
        }

        let rows = sqlx::query_as::<_, Application>(&format!(
            "{APPLICATION_SELECT} WHERE a.job_id = $1 ORDER BY a.created_at ASC"
        ))
        .bind(job_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Job owner moves an application along.
    pub async fn set_status(
        &self,
        id: Uuid,
        owner_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, DbError> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE applications a SET status = $3, updated_at = NOW()
             FROM jobs j
             WHERE a.id = $1 AND a.job_id = j.id AND j.owner_id = $2
             RETURNING a.id",
        )
        .bind(id)
        .bind(owner_id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;

        if updated.is_none() {
            let job_owner: Option<Uuid> = sqlx::query_scalar(
                "SELECT j.owner_id FROM applications a JOIN jobs j ON j.id = a.job_id
                 WHERE a.id = $1",
            )
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
            return Err(match job_owner {
                Some(_) => DbError::Forbidden("application belongs to another user's job".into()),
                None => DbError::not_found("application", id),
            });
        }

        tracing::info!(application_id = %id, status = status.as_str(), "application status changed");
        sqlx::query_as::<_, Application>(&format!("{APPLICATION_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("application", id))
    }

    /// Applicant withdraws an application still in `pending`.
    pub async fn withdraw(&self, id: Uuid, applicant_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(
            "DELETE FROM applications WHERE id = $1 AND applicant_id = $2 AND status = 'pending'",
        )
        .bind(id)
        .bind(applicant_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(application_id = %id, "application withdrawn");
            return Ok(());
        }

        let existing: Option<(Uuid, String)> =
            sqlx::query_as("SELECT applicant_id, status FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Err(match existing {
            None => DbError::not_found("application", id),
            Some((owner, _)) if owner != applicant_id => {
                DbError::Forbidden("application belongs to another user".into())
            }
            Some((_, status)) => {
                DbError::Conflict(format!("cannot withdraw a {status} application"))
            }
        })
    }
}
