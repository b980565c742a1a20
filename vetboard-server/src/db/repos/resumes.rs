//! Résumé repository
//!
//! A résumé is one `detailed_resumes` row plus four child tables. Saving
//! replaces the whole thing: upsert the parent, delete every child
//! row, re-insert the submitted children. All of it runs in one transaction
//! so a failure halfway leaves the previous résumé untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{collect_page, contains_pattern};
use crate::db::DbError;
use crate::models::resume::{CapabilityForm, EducationForm, ExperienceForm, LicenseForm, Ordered};
use crate::models::{Paginated, Pagination, ResumeDraft, ResumeFilter};

const RESUME_COLUMNS: &str = "id, user_id, title, name, birth_date, gender, phone, email, address, \
     photo_url, introduction, desired_position, desired_salary, desired_work_types, \
     desired_regions, available_date, self_introduction, is_public, view_count, \
     created_at, updated_at";

/// Parent row of a résumé
#[derive(Debug, Clone, FromRow)]
struct ResumeRow {
    id: Uuid,
    user_id: Uuid,
    title: Option<String>,
    name: String,
    birth_date: Option<NaiveDate>,
    gender: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    photo_url: Option<String>,
    introduction: Option<String>,
    desired_position: Option<String>,
    desired_salary: Option<i32>,
    desired_work_types: Vec<String>,
    desired_regions: Vec<String>,
    available_date: Option<NaiveDate>,
    self_introduction: Option<String>,
    is_public: bool,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub hospital_name: Option<String>,
    pub position: Option<String>,
    pub main_tasks: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: Uuid,
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub acquired_date: Option<NaiveDate>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Uuid,
    pub degree: Option<String>,
    pub school_name: Option<String>,
    pub major: Option<String>,
    pub gpa: Option<String>,
    pub total_gpa: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub graduation_status: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalCapability {
    pub id: Uuid,
    pub field: Option<String>,
    pub proficiency: Option<String>,
    pub description: Option<String>,
    pub others: Option<String>,
    pub sort_order: i32,
}

/// Full résumé with child collections in `sort_order`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub introduction: Option<String>,
    pub desired_position: Option<String>,
    pub desired_salary: Option<i32>,
    pub desired_work_types: Vec<String>,
    pub desired_regions: Vec<String>,
    pub available_date: Option<NaiveDate>,
    pub self_introduction: Option<String>,
    pub is_public: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub experiences: Vec<Experience>,
    pub licenses: Vec<License>,
    pub educations: Vec<Education>,
    pub medical_capabilities: Vec<MedicalCapability>,
}

/// Row for the public résumé list
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicResumeSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub name: String,
    pub desired_position: Option<String>,
    pub desired_regions: Vec<String>,
    pub desired_salary: Option<i32>,
    pub experience_count: i64,
    pub view_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// Résumé repository
pub struct ResumeRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ResumeRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save the caller's résumé, replacing any previous version.
    ///
    /// Returns the résumé id.
    pub async fn save(&self, user_id: Uuid, draft: &ResumeDraft) -> Result<Uuid, DbError> {
        let mut tx = self.pool.begin().await?;

        // Upsert locks the parent row, so concurrent saves for one user serialize here
        let (resume_id, created) = upsert_parent(&mut tx, user_id, draft).await?;

        for table in [
            "resume_experiences",
            "resume_licenses",
            "resume_educations",
            "resume_medical_capabilities",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE resume_id = $1"))
                .bind(resume_id)
                .execute(&mut *tx)
                .await?;
        }

        insert_experiences(&mut tx, resume_id, &draft.experiences).await?;
        insert_licenses(&mut tx, resume_id, &draft.licenses).await?;
        insert_educations(&mut tx, resume_id, &draft.educations).await?;
        insert_capabilities(&mut tx, resume_id, &draft.medical_capabilities).await?;

        tx.commit().await?;

        tracing::info!(
            %user_id,
            %resume_id,
            created,
            experiences = draft.experiences.len(),
            licenses = draft.licenses.len(),
            educations = draft.educations.len(),
            capabilities = draft.medical_capabilities.len(),
            "résumé saved"
        );
        Ok(resume_id)
    }

    /// Load the résumé owned by `user_id`, if any.
    pub async fn find_for_user(&self, user_id: Uuid) -> Result<Option<Resume>, DbError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM detailed_resumes WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_children(row).await?)),
            None => Ok(None),
        }
    }

    /// Public résumé by id. Counts as a view.
    pub async fn view_public(&self, id: Uuid) -> Result<Resume, DbError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "UPDATE detailed_resumes SET view_count = view_count + 1
             WHERE id = $1 AND is_public
             RETURNING {RESUME_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("resume", id))?;

        self.with_children(row).await
    }

    /// List public résumés, most recently updated first.
    pub async fn list_public(
        &self,
        filter: &ResumeFilter,
        page: Pagination,
    ) -> Result<Paginated<PublicResumeSummary>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT r.id, r.title, r.name, r.desired_position, r.desired_regions, \
             r.desired_salary, r.view_count, r.updated_at, \
             (SELECT COUNT(*) FROM resume_experiences e WHERE e.resume_id = r.id) AS experience_count, \
             COUNT(*) OVER() AS total \
             FROM detailed_resumes r WHERE r.is_public",
        );

        push_filters(&mut qb, filter);

        qb.push(" ORDER BY r.updated_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(self.pool).await?;
        collect_page(rows, page, || self.count(filter)).await
    }

    async fn count(&self, filter: &ResumeFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM detailed_resumes r WHERE r.is_public",
        );
        push_filters(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }

    /// Delete the caller's résumé. Children go with it (ON DELETE CASCADE).
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM detailed_resumes WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Résumé id owned by `user_id`, used when applying to a job.
    pub async fn id_for_user(&self, user_id: Uuid) -> Result<Option<Uuid>, DbError> {
        let id = sqlx::query_scalar("SELECT id FROM detailed_resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(id)
    }

    async fn with_children(&self, row: ResumeRow) -> Result<Resume, DbError> {
        let (experiences, licenses, educations, medical_capabilities) = tokio::try_join!(
            sqlx::query_as::<_, Experience>(
                "SELECT id, hospital_name, position, main_tasks, start_date, end_date, sort_order
                 FROM resume_experiences WHERE resume_id = $1
                 ORDER BY sort_order ASC, id ASC",
            )
            .bind(row.id)
            .fetch_all(self.pool),
            sqlx::query_as::<_, License>(
                "SELECT id, name, issuer, acquired_date, sort_order
                 FROM resume_licenses WHERE resume_id = $1
                 ORDER BY sort_order ASC, id ASC",
            )
            .bind(row.id)
            .fetch_all(self.pool),
            sqlx::query_as::<_, Education>(
                "SELECT id, degree, school_name, major, gpa, total_gpa, start_date, end_date,
                        graduation_status, sort_order
                 FROM resume_educations WHERE resume_id = $1
                 ORDER BY sort_order ASC, id ASC",
            )
            .bind(row.id)
            .fetch_all(self.pool),
            sqlx::query_as::<_, MedicalCapability>(
                "SELECT id, field, proficiency, description, others, sort_order
                 FROM resume_medical_capabilities WHERE resume_id = $1
                 ORDER BY sort_order ASC, id ASC",
            )
            .bind(row.id)
            .fetch_all(self.pool),
        )?;

        Ok(Resume {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            name: row.name,
            birth_date: row.birth_date,
            gender: row.gender,
            phone: row.phone,
            email: row.email,
            address: row.address,
            photo_url: row.photo_url,
            introduction: row.introduction,
            desired_position: row.desired_position,
            desired_salary: row.desired_salary,
            desired_work_types: row.desired_work_types,
            desired_regions: row.desired_regions,
            available_date: row.available_date,
            self_introduction: row.self_introduction,
            is_public: row.is_public,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            experiences,
            licenses,
            educations,
            medical_capabilities,
        })
    }
}

/// Insert the parent row or overwrite the caller's existing one.
///
/// Returns the id and whether the row was newly created.
async fn upsert_parent(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    d: &ResumeDraft,
) -> Result<(Uuid, bool), sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO detailed_resumes (
            user_id, title, name, birth_date, gender, phone, email, address, photo_url,
            introduction, desired_position, desired_salary, desired_work_types,
            desired_regions, available_date, self_introduction, is_public
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        ON CONFLICT (user_id) DO UPDATE SET
            title = EXCLUDED.title,
            name = EXCLUDED.name,
            birth_date = EXCLUDED.birth_date,
            gender = EXCLUDED.gender,
            phone = EXCLUDED.phone,
            email = EXCLUDED.email,
            address = EXCLUDED.address,
            photo_url = EXCLUDED.photo_url,
            introduction = EXCLUDED.introduction,
            desired_position = EXCLUDED.desired_position,
            desired_salary = EXCLUDED.desired_salary,
            desired_work_types = EXCLUDED.desired_work_types,
            desired_regions = EXCLUDED.desired_regions,
            available_date = EXCLUDED.available_date,
            self_introduction = EXCLUDED.self_introduction,
            is_public = EXCLUDED.is_public,
            updated_at = NOW()
        RETURNING id, (xmax = 0) AS created
        "#,
    )
    .bind(user_id)
    .bind(d.title.as_deref())
    .bind(&d.name)
    .bind(d.birth_date)
    .bind(d.gender.as_deref())
    .bind(d.phone.as_deref())
    .bind(d.email.as_deref())
    .bind(d.address.as_deref())
    .bind(d.photo_url.as_deref())
    .bind(d.introduction.as_deref())
    .bind(d.desired_position.as_deref())
    .bind(d.desired_salary)
    .bind(&d.desired_work_types)
    .bind(&d.desired_regions)
    .bind(d.available_date)
    .bind(d.self_introduction.as_deref())
    .bind(d.is_public)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_experiences(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: Uuid,
    entries: &[Ordered<ExperienceForm>],
) -> Result<(), sqlx::Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO resume_experiences \
         (resume_id, hospital_name, position, main_tasks, start_date, end_date, sort_order) ",
    );
    qb.push_values(entries, |mut b, o| {
        b.push_bind(resume_id)
            .push_bind(o.entry.hospital_name.clone())
            .push_bind(o.entry.position.clone())
            .push_bind(o.entry.main_tasks.clone())
            .push_bind(o.entry.start_date)
            .push_bind(o.entry.end_date)
            .push_bind(o.sort_order);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

async fn insert_licenses(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: Uuid,
    entries: &[Ordered<LicenseForm>],
) -> Result<(), sqlx::Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO resume_licenses (resume_id, name, issuer, acquired_date, sort_order) ",
    );
    qb.push_values(entries, |mut b, o| {
        b.push_bind(resume_id)
            .push_bind(o.entry.name.clone())
            .push_bind(o.entry.issuer.clone())
            .push_bind(o.entry.acquired_date)
            .push_bind(o.sort_order);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

async fn insert_educations(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: Uuid,
    entries: &[Ordered<EducationForm>],
) -> Result<(), sqlx::Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO resume_educations \
         (resume_id, degree, school_name, major, gpa, total_gpa, start_date, end_date, \
          graduation_status, sort_order) ",
    );
    qb.push_values(entries, |mut b, o| {
        b.push_bind(resume_id)
            .push_bind(o.entry.degree.clone())
            .push_bind(o.entry.school_name.clone())
            .push_bind(o.entry.major.clone())
            .push_bind(o.entry.gpa.clone())
            .push_bind(o.entry.total_gpa.clone())
            .push_bind(o.entry.start_date)
            .push_bind(o.entry.end_date)
            .push_bind(o.entry.graduation_status.clone())
            .push_bind(o.sort_order);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

async fn insert_capabilities(
    tx: &mut Transaction<'_, Postgres>,
    resume_id: Uuid,
    entries: &[Ordered<CapabilityForm>],
) -> Result<(), sqlx::Error> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO resume_medical_capabilities \
         (resume_id, field, proficiency, description, others, sort_order) ",
    );
    qb.push_values(entries, |mut b, o| {
        b.push_bind(resume_id)
            .push_bind(o.entry.field.clone())
            .push_bind(o.entry.proficiency.clone())
            .push_bind(o.entry.description.clone())
            .push_bind(o.entry.others.clone())
            .push_bind(o.sort_order);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

/// WHERE conditions shared by the public résumés page and its count.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ResumeFilter) {
    if let Some(position) = &filter.position {
        qb.push(" AND r.desired_position ILIKE ")
            .push_bind(contains_pattern(position));
    }
    if let Some(region) = &filter.region {
        qb.push(" AND ").push_bind(region.clone()).push(" = ANY(r.desired_regions)");
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = contains_pattern(keyword);
        qb.push(" AND (r.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.introduction ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::users::test_support::{insert_user, test_pool};
    use crate::models::resume::ResumeForm;
    use crate::models::Role;

    fn form() -> ResumeForm {
        ResumeForm {
            name: "김수의".into(),
            desired_position: Some("임상수의사".into()),
            desired_regions: vec!["서울".into()],
            is_public: true,
            experiences: vec![
                ExperienceForm {
                    hospital_name: Some("첫번째 병원".into()),
                    start_date: NaiveDate::from_ymd_opt(2019, 3, 1),
                    end_date: NaiveDate::from_ymd_opt(2021, 2, 28),
                    ..Default::default()
                },
                ExperienceForm {
                    hospital_name: Some("두번째 병원".into()),
                    start_date: NaiveDate::from_ymd_opt(2021, 3, 1),
                    ..Default::default()
                },
            ],
            licenses: vec![LicenseForm {
                name: Some("수의사 면허".into()),
                issuer: Some("농림축산식품부".into()),
                acquired_date: NaiveDate::from_ymd_opt(2019, 2, 1),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn save_then_read_round_trips() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;
        let repo = ResumeRepo::new(&pool);

        let draft = form().validate().unwrap();
        let id = repo.save(user.id, &draft).await.unwrap();

        let resume = repo.find_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(resume.id, id);
        assert_eq!(resume.name, "김수의");
        assert_eq!(resume.desired_regions, vec!["서울"]);
        let hospitals: Vec<_> = resume
            .experiences
            .iter()
            .map(|e| e.hospital_name.as_deref().unwrap())
            .collect();
        assert_eq!(hospitals, vec!["첫번째 병원", "두번째 병원"]);
        assert_eq!(resume.licenses[0].issuer.as_deref(), Some("농림축산식품부"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn resave_replaces_children_and_keeps_id() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;
        let repo = ResumeRepo::new(&pool);

        let first = repo.save(user.id, &form().validate().unwrap()).await.unwrap();

        let mut second_form = form();
        second_form.experiences.reverse();
        second_form.licenses.clear();
        let second = repo
            .save(user.id, &second_form.validate().unwrap())
            .await
            .unwrap();
        assert_eq!(first, second);

        let resume = repo.find_for_user(user.id).await.unwrap().unwrap();
        assert!(resume.licenses.is_empty());
        assert_eq!(
            resume.experiences[0].hospital_name.as_deref(),
            Some("두번째 병원")
        );
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn failed_save_keeps_previous_version() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;
        let repo = ResumeRepo::new(&pool);
        let id = repo.save(user.id, &form().validate().unwrap()).await.unwrap();
        let before = repo.find_for_user(user.id).await.unwrap().unwrap();

        // Parent update and the first three child tables succeed; the last
        // child insert fails because Postgres rejects NUL in text.
        let mut broken = form();
        broken.name = "바뀐 이름".into();
        broken.experiences.clear();
        let mut draft = broken.validate().unwrap();
        draft.medical_capabilities.push(Ordered {
            sort_order: 0,
            entry: CapabilityForm {
                field: Some("외과\0수술".into()),
                ..Default::default()
            },
        });
        assert!(repo.save(user.id, &draft).await.is_err());

        let after = repo.find_for_user(user.id).await.unwrap().unwrap();
        assert_eq!(after.id, id);
        assert_eq!(after.name, "김수의");
        assert_eq!(after.experiences, before.experiences);
        assert_eq!(after.licenses, before.licenses);
        assert!(after.medical_capabilities.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_first_saves_share_one_row() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;
        let draft = form().validate().unwrap();
        let repo = ResumeRepo::new(&pool);

        let (a, b) = tokio::join!(repo.save(user.id, &draft), repo.save(user.id, &draft));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(repo.find_for_user(user.id).await.unwrap().unwrap().experiences.len(), 2);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn public_view_increments_monotonically() {
        let pool = test_pool().await;
        let user = insert_user(&pool, Role::User).await;
        let repo = ResumeRepo::new(&pool);
        let id = repo.save(user.id, &form().validate().unwrap()).await.unwrap();

        let a = repo.view_public(id).await.unwrap().view_count;
        let b = repo.view_public(id).await.unwrap().view_count;
        assert_eq!(b, a + 1);
    }
}
