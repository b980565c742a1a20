//! Database error type

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map constraint violations to domain errors; anything else stays `Sqlx`.
    ///
    /// - unique violation (23505) -> `Conflict(what)`
    /// - foreign key violation (23503) -> `NotFound { resource, .. }`
    pub fn from_constraint(err: sqlx::Error, what: &str, resource: &'static str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(what.to_string());
            }
            if db.is_foreign_key_violation() {
                return Self::NotFound {
                    resource,
                    id: db.constraint().unwrap_or("reference").to_string(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_pass_through() {
        let err = DbError::from_constraint(sqlx::Error::RowNotFound, "dup", "job");
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn not_found_display() {
        let err = DbError::not_found("job", 42);
        assert_eq!(err.to_string(), "not found: job '42'");
    }
}
