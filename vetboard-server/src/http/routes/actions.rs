//! Résumé editor actions
//!
//! POST endpoints that take a bearer token and a typed payload and answer
//! `{success, data, error?}` with HTTP 200. Every failure after the body has
//! been parsed, auth included, is reported in the body.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::db::repos::{Resume, ResumeRepo};
use crate::http::envelope::ActionResult;
use crate::http::error::ApiError;
use crate::http::extractors::authenticate;
use crate::http::server::AppState;
use crate::models::ResumeForm;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResume {
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeletedResume {
    pub deleted: bool,
}

/// POST /api/actions/resume/get
///
/// `data` is null when the caller has no résumé yet.
async fn get_resume(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ActionResult<Resume> {
    let result = async {
        let user = authenticate(&state, &headers).await?;
        let resume = ResumeRepo::new(&state.pool).find_for_user(user.id).await?;
        Ok::<_, ApiError>(resume)
    }
    .await;
    result.into()
}

/// POST /api/actions/resume/save
async fn save_resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<ResumeForm>,
) -> ActionResult<SavedResume> {
    let result = async {
        let user = authenticate(&state, &headers).await?;
        let draft = form.validate()?;
        let resume_id = ResumeRepo::new(&state.pool).save(user.id, &draft).await?;
        Ok::<_, ApiError>(Some(SavedResume { resume_id }))
    }
    .await;

    if let Err(e) = &result {
        tracing::warn!("résumé save failed: {:?}", e);
    }
    result.into()
}

/// POST /api/actions/resume/delete
async fn delete_resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ActionResult<DeletedResume> {
    let result = async {
        let user = authenticate(&state, &headers).await?;
        let deleted = ResumeRepo::new(&state.pool).delete_for_user(user.id).await?;
        if deleted {
            tracing::info!(user_id = %user.id, "résumé deleted");
        }
        Ok::<_, ApiError>(Some(DeletedResume { deleted }))
    }
    .await;
    result.into()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/actions/resume/get", post(get_resume))
        .route("/api/actions/resume/save", post(save_resume))
        .route("/api/actions/resume/delete", post(delete_resume))
}
