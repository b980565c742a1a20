//! Schema migrations
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements, applied in order.
//! Safe to run on every start.

use sqlx::PgPool;

/// Ordered schema statements
const STATEMENTS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            phone TEXT,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "users_email_lower_idx",
        "CREATE INDEX IF NOT EXISTS users_email_lower_idx ON users (LOWER(TRIM(email)))",
    ),
    (
        "detailed_resumes",
        r#"
        CREATE TABLE IF NOT EXISTS detailed_resumes (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            title TEXT,
            name TEXT NOT NULL,
            birth_date DATE,
            gender TEXT,
            phone TEXT,
            email TEXT,
            address TEXT,
            photo_url TEXT,
            introduction TEXT,
            desired_position TEXT,
            desired_salary INTEGER,
            desired_work_types TEXT[] NOT NULL DEFAULT '{}',
            desired_regions TEXT[] NOT NULL DEFAULT '{}',
            available_date DATE,
            self_introduction TEXT,
            is_public BOOLEAN NOT NULL DEFAULT FALSE,
            view_count BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "resume_experiences",
        r#"
        CREATE TABLE IF NOT EXISTS resume_experiences (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            resume_id UUID NOT NULL REFERENCES detailed_resumes(id) ON DELETE CASCADE,
            hospital_name TEXT,
            position TEXT,
            main_tasks TEXT,
            start_date DATE,
            end_date DATE,
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "resume_licenses",
        r#"
        CREATE TABLE IF NOT EXISTS resume_licenses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            resume_id UUID NOT NULL REFERENCES detailed_resumes(id) ON DELETE CASCADE,
            name TEXT,
            issuer TEXT,
            acquired_date DATE,
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "resume_educations",
        r#"
        CREATE TABLE IF NOT EXISTS resume_educations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            resume_id UUID NOT NULL REFERENCES detailed_resumes(id) ON DELETE CASCADE,
            degree TEXT,
            school_name TEXT,
            major TEXT,
            gpa TEXT,
            total_gpa TEXT,
            start_date DATE,
            end_date DATE,
            graduation_status TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "resume_medical_capabilities",
        r#"
        CREATE TABLE IF NOT EXISTS resume_medical_capabilities (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            resume_id UUID NOT NULL REFERENCES detailed_resumes(id) ON DELETE CASCADE,
            field TEXT,
            proficiency TEXT,
            description TEXT,
            others TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )
        "#,
    ),
    (
        "jobs",
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            hospital_name TEXT NOT NULL,
            position TEXT NOT NULL,
            work_type TEXT,
            region TEXT NOT NULL,
            salary_min INTEGER,
            salary_max INTEGER,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'closed')),
            is_hidden BOOLEAN NOT NULL DEFAULT FALSE,
            view_count BIGINT NOT NULL DEFAULT 0,
            deadline DATE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "transfers",
        r#"
        CREATE TABLE IF NOT EXISTS transfers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            category TEXT NOT NULL CHECK (category IN ('hospital', 'equipment', 'lease')),
            region TEXT NOT NULL,
            price BIGINT,
            area DOUBLE PRECISION,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'reserved', 'completed')),
            is_hidden BOOLEAN NOT NULL DEFAULT FALSE,
            view_count BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "forum_posts",
        r#"
        CREATE TABLE IF NOT EXISTS forum_posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            is_hidden BOOLEAN NOT NULL DEFAULT FALSE,
            view_count BIGINT NOT NULL DEFAULT 0,
            comment_count BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "forum_comments",
        r#"
        CREATE TABLE IF NOT EXISTS forum_comments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            post_id UUID NOT NULL REFERENCES forum_posts(id) ON DELETE CASCADE,
            author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "lectures",
        r#"
        CREATE TABLE IF NOT EXISTS lectures (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            instructor TEXT NOT NULL,
            category TEXT NOT NULL,
            description TEXT,
            video_url TEXT NOT NULL,
            thumbnail_url TEXT,
            duration_seconds INTEGER,
            view_count BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "applications",
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            job_id UUID NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
            applicant_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            resume_id UUID REFERENCES detailed_resumes(id) ON DELETE SET NULL,
            cover_letter TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'reviewed', 'accepted', 'rejected')),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (job_id, applicant_id)
        )
        "#,
    ),
    (
        "messages",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            sender_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            recipient_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            subject TEXT,
            content TEXT NOT NULL,
            read_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "bookmarks",
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            target_kind TEXT NOT NULL,
            target_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, target_kind, target_id)
        )
        "#,
    ),
    (
        "resume_children_order_idx",
        r#"
        CREATE INDEX IF NOT EXISTS resume_experiences_order_idx
            ON resume_experiences (resume_id, sort_order)
        "#,
    ),
    (
        "jobs_listing_idx",
        "CREATE INDEX IF NOT EXISTS jobs_listing_idx ON jobs (is_hidden, status, created_at DESC)",
    ),
    (
        "transfers_listing_idx",
        "CREATE INDEX IF NOT EXISTS transfers_listing_idx ON transfers (is_hidden, created_at DESC)",
    ),
    (
        "forum_posts_listing_idx",
        "CREATE INDEX IF NOT EXISTS forum_posts_listing_idx ON forum_posts (is_hidden, category, created_at DESC)",
    ),
    (
        "messages_inbox_idx",
        "CREATE INDEX IF NOT EXISTS messages_inbox_idx ON messages (recipient_id, created_at DESC)",
    ),
];

/// Run all migrations inside one transaction.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    let mut tx = pool.begin().await?;
    for (name, sql) in STATEMENTS {
        tracing::debug!(migration = *name, "applying");
        sqlx::query(*sql).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(count = STATEMENTS.len(), "Schema migrations complete");
    Ok(())
}

/// Names of the statements, in application order.
pub fn names() -> impl Iterator<Item = &'static str> {
    STATEMENTS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_are_created_before_children() {
        let order: Vec<&str> = names().collect();
        let pos = |n: &str| order.iter().position(|x| *x == n).unwrap();

        assert!(pos("users") < pos("detailed_resumes"));
        assert!(pos("detailed_resumes") < pos("resume_experiences"));
        assert!(pos("jobs") < pos("applications"));
        assert!(pos("forum_posts") < pos("forum_comments"));
    }

    #[test]
    fn names_are_unique() {
        let mut order: Vec<&str> = names().collect();
        let before = order.len();
        order.sort_unstable();
        order.dedup();
        assert_eq!(order.len(), before);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();
    }
}
