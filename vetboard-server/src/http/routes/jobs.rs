//! Job posting endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::db::repos::{Job, JobRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{JobFilter, JobForm, JobListParams, Paginated, Pagination, PaginationParams};

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// GET /api/jobs - filtered, sorted, paginated
async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<JobListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Job>>>, ApiError> {
    let filter = JobFilter::try_from(params)?;
    let page = JobRepo::new(&state.pool)
        .list(&filter, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

/// GET /api/jobs/{id} - counts as a view
async fn get_job(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<Job>>, ApiError> {
    Ok(ok(JobRepo::new(&state.pool).view(id).await?))
}

/// POST /api/jobs
async fn create_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(form): Json<JobForm>,
) -> Result<(StatusCode, Json<Envelope<Job>>), ApiError> {
    let draft = form.validate()?;
    let job = JobRepo::new(&state.pool).create(user.id, &draft).await?;
    Ok(created(job))
}

/// PUT /api/jobs/{id} - owner only
async fn update_job(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(form): Json<JobForm>,
) -> Result<Json<Envelope<Job>>, ApiError> {
    let draft = form.validate()?;
    Ok(ok(JobRepo::new(&state.pool).update(id, user.id, &draft).await?))
}

/// POST /api/jobs/{id}/close - owner only
async fn close_job(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Job>>, ApiError> {
    Ok(ok(JobRepo::new(&state.pool).close(id, user.id).await?))
}

/// DELETE /api/jobs/{id} - owner only
async fn delete_job(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    JobRepo::new(&state.pool).delete(id, user.id).await?;
    Ok(ok(Deleted { deleted: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/jobs", get(list_jobs).post(create_job))
        .route(
            "/api/jobs/{id}",
            get(get_job).put(update_job).delete(delete_job),
        )
        .route("/api/jobs/{id}/close", post(close_job))
}

#[cfg(test)]
mod tests {
    use crate::auth::test_support::token_for;
    use crate::db::repos::users::test_support::insert_user;
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::{db_state, lazy_state};
    use crate::models::Role;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn job_json(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "hospitalName": "24시 동물메디컬센터",
            "position": "임상수의사",
            "workType": "정규직",
            "region": "경기",
            "salaryMin": 5000,
            "salaryMax": 7000,
            "description": "야간 진료 가능자 우대"
        })
    }

    #[tokio::test]
    async fn unknown_sort_is_rejected() {
        let (status, body) = send(
            build_router(lazy_state()),
            Method::GET,
            "/api/jobs?sort=random",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn create_requires_auth() {
        let (status, _) = send(
            build_router(lazy_state()),
            Method::POST,
            "/api/jobs",
            None,
            Some(job_json("공고")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_view_close_flow() {
        let state = db_state().await;
        let owner = insert_user(&state.pool, Role::User).await;
        let token = token_for(Some(&owner.email), None, 600);

        let (status, body) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/jobs",
            Some(&token),
            Some(job_json("야간 수의사 모집")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            build_router(state.clone()),
            Method::GET,
            &format!("/api/jobs/{id}"),
            None,
            None,
        )
        .await;
        assert_eq!(body["data"]["viewCount"], 1);

        let (_, body) = send(
            build_router(state),
            Method::POST,
            &format!("/api/jobs/{id}/close"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["data"]["status"], "closed");
    }
}
