//! Admin moderation: hide, unhide, and delete user content

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::DbError;
use crate::models::ModeratedKind;

pub struct ModerationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ModerationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Hide or unhide a row. Hidden rows drop out of public lists and reads.
    pub async fn set_hidden(
        &self,
        kind: ModeratedKind,
        id: Uuid,
        hidden: bool,
    ) -> Result<(), DbError> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET is_hidden = $2 WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .bind(hidden)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.resource(), id));
        }
        tracing::info!(kind = kind.resource(), %id, hidden, "moderation visibility changed");
        Ok(())
    }

    pub async fn delete(&self, kind: ModeratedKind, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.resource(), id));
        }
        tracing::info!(kind = kind.resource(), %id, "content deleted by admin");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::jobs::test_support::draft;
    use crate::db::repos::users::test_support::{insert_user, test_pool};
    use crate::db::repos::JobRepo;
    use crate::models::Role;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn hidden_jobs_are_not_viewable() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, Role::User).await;
        let jobs = JobRepo::new(&pool);
        let job = jobs.create(owner.id, &draft("숨김 공고")).await.unwrap();

        let repo = ModerationRepo::new(&pool);
        repo.set_hidden(ModeratedKind::Job, job.id, true).await.unwrap();
        assert!(matches!(
            jobs.view(job.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));

        repo.set_hidden(ModeratedKind::Job, job.id, false).await.unwrap();
        assert!(jobs.view(job.id).await.is_ok());
    }
}
