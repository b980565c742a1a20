//! User repository
//!
//! Accounts are created by the external auth service; this side reads them,
//! lets users edit their profile, and lets admins deactivate them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{collect_page, contains_pattern};
use crate::auth::Claims;
use crate::db::DbError;
use crate::models::{Paginated, Pagination, ProfileDraft, Role};

const USER_COLUMNS: &str = "id, email, name, phone, role, is_active, created_at";

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_db(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the account behind verified token claims.
    ///
    /// Tried in order, first hit wins:
    /// 1. exact email match
    /// 2. trimmed, case-insensitive email match (older accounts were stored
    ///    with whatever casing the sign-up form produced)
    /// 3. `sub` parsed as a user id
    pub async fn resolve(&self, claims: &Claims) -> Result<Option<User>, DbError> {
        if let Some(email) = claims.email.as_deref() {
            let exact = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
            if exact.is_some() {
                return Ok(exact);
            }

            let normalised = email.trim().to_lowercase();
            let loose = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE LOWER(TRIM(email)) = $1
                 ORDER BY created_at ASC
                 LIMIT 1"
            ))
            .bind(&normalised)
            .fetch_optional(self.pool)
            .await?;
            if loose.is_some() {
                tracing::debug!(email = %normalised, "resolved user by normalised email");
                return Ok(loose);
            }
        }

        if let Some(id) = claims.sub.as_deref().and_then(|s| Uuid::parse_str(s).ok()) {
            let by_id = self.find(id).await?;
            if by_id.is_some() {
                tracing::debug!(user_id = %id, "resolved user by token subject");
            }
            return Ok(by_id);
        }

        Ok(None)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    pub async fn update_profile(&self, id: Uuid, profile: ProfileDraft) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, phone = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&profile.name)
        .bind(profile.phone.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Admin listing, newest first, optional keyword over email and name.
    pub async fn list(
        &self,
        keyword: Option<&str>,
        page: Pagination,
    ) -> Result<Paginated<User>, DbError> {
        let pattern = keyword.map(contains_pattern);
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, COUNT(*) OVER() AS total
             FROM users
             WHERE ($1::TEXT IS NULL OR email ILIKE $1 OR name ILIKE $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(pattern.as_deref())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        collect_page(rows, page, || async {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users
                 WHERE ($1::TEXT IS NULL OR email ILIKE $1 OR name ILIKE $1)",
            )
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await
        })
        .await
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Insert a user with a random email for database-backed tests.
    pub async fn insert_user(pool: &PgPool, role: Role) -> User {
        let email = format!("{}@test.vetboard", Uuid::new_v4());
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, role) VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind("테스트 사용자")
        .bind(role.as_str())
        .fetch_one(pool)
        .await
        .expect("insert user")
    }

    pub async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn admin_flag_follows_role() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "a@b.kr".into(),
            name: "a".into(),
            phone: None,
            role: "user".into(),
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(!user.is_admin());
        user.role = "admin".into();
        assert!(user.is_admin());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn resolve_falls_back_to_case_insensitive_email() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;

        let claims = Claims {
            email: Some(format!("  {}  ", user.email.to_uppercase())),
            sub: None,
            exp: 0,
        };
        let found = UserRepo::new(&pool).resolve(&claims).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn resolve_falls_back_to_subject() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;

        let claims = Claims {
            email: Some("nobody@nowhere.kr".into()),
            sub: Some(user.id.to_string()),
            exp: 0,
        };
        let found = UserRepo::new(&pool).resolve(&claims).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }
}
