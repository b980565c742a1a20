//! Job application endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Application, ApplicationRepo, ApplicationWithJob, ResumeRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::application::cover_letter;
use crate::models::{ApplicationStatus, ValidationError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct Withdrawn {
    pub withdrawn: bool,
}

/// POST /api/jobs/{id}/applications - apply with the caller's résumé, if any
async fn apply(
    State(state): State<Arc<AppState>>,
    ValidUuid(job_id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Envelope<Application>>), ApiError> {
    let letter = cover_letter(req.cover_letter.as_deref())?;
    let resume_id = ResumeRepo::new(&state.pool).id_for_user(user.id).await?;

    let application = ApplicationRepo::new(&state.pool)
        .apply(job_id, user.id, resume_id, letter.as_deref())
        .await?;
    Ok(created(application))
}

/// GET /api/jobs/{id}/applications - job owner only
async fn list_for_job(
    State(state): State<Arc<AppState>>,
    ValidUuid(job_id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<Application>>>, ApiError> {
    let applications = ApplicationRepo::new(&state.pool)
        .list_for_job(job_id, user.id)
        .await?;
    Ok(ok(applications))
}

/// GET /api/applications/mine
async fn list_mine(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Vec<ApplicationWithJob>>>, ApiError> {
    Ok(ok(ApplicationRepo::new(&state.pool).list_mine(user.id).await?))
}

/// PUT /api/applications/{id}/status - job owner only
async fn set_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Envelope<Application>>, ApiError> {
    let status = ApplicationStatus::parse(&req.status)?;
    if !status.owner_settable() {
        return Err(ValidationError::InvalidVariant {
            field: "application status",
            value: req.status,
        }
        .into());
    }

    let application = ApplicationRepo::new(&state.pool)
        .set_status(id, user.id, status)
        .await?;
    Ok(ok(application))
}

/// DELETE /api/applications/{id} - applicant withdraws a pending application
async fn withdraw(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Withdrawn>>, ApiError> {
    ApplicationRepo::new(&state.pool).withdraw(id, user.id).await?;
    Ok(ok(Withdrawn { withdrawn: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/jobs/{id}/applications", get(list_for_job).post(apply))
        .route("/api/applications/mine", get(list_mine))
        .route("/api/applications/{id}/status", put(set_status))
        .route("/api/applications/{id}", delete(withdraw))
}
