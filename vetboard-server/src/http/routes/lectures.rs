//! Lecture endpoints. Anyone may browse; admins add and remove.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::db::repos::{Lecture, LectureRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    LectureFilter, LectureForm, LectureListParams, Paginated, Pagination, PaginationParams,
};

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

async fn list_lectures(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LectureListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Lecture>>>, ApiError> {
    let filter = LectureFilter::try_from(params)?;
    let page = LectureRepo::new(&state.pool)
        .list(&filter, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

/// GET /api/lectures/{id} - counts as a view
async fn get_lecture(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<Lecture>>, ApiError> {
    Ok(ok(LectureRepo::new(&state.pool).view(id).await?))
}

async fn create_lecture(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(form): Json<LectureForm>,
) -> Result<(StatusCode, Json<Envelope<Lecture>>), ApiError> {
    let draft = form.validate()?;
    let lecture = LectureRepo::new(&state.pool).create(&draft).await?;
    tracing::info!(admin_id = %admin.id, lecture_id = %lecture.id, "admin added lecture");
    Ok(created(lecture))
}

async fn delete_lecture(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    LectureRepo::new(&state.pool).delete(id).await?;
    Ok(ok(Deleted { deleted: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/lectures", get(list_lectures).post(create_lecture))
        .route("/api/lectures/{id}", get(get_lecture).delete(delete_lecture))
}

#[cfg(test)]
mod tests {
    use crate::auth::test_support::token_for;
    use crate::db::repos::users::test_support::insert_user;
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::db_state;
    use crate::models::Role;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    fn lecture_json() -> serde_json::Value {
        json!({
            "title": "복부 초음파 기초",
            "instructor": "박강사",
            "category": "영상진단",
            "videoUrl": "https://video.example.kr/abdomen"
        })
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn only_admins_create() {
        let state = db_state().await;
        let user = insert_user(&state.pool, Role::User).await;
        let admin = insert_user(&state.pool, Role::Admin).await;

        let (status, _) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/lectures",
            Some(&token_for(Some(&user.email), None, 600)),
            Some(lecture_json()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            build_router(state),
            Method::POST,
            "/api/lectures",
            Some(&token_for(Some(&admin.email), None, 600)),
            Some(lecture_json()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["instructor"], "박강사");
    }
}
