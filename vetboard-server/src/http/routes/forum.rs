//! Forum endpoints: posts, view counter, comments

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Comment, ForumPost, ForumRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, OptionalUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    CommentContent, ForumFilter, ForumListParams, Paginated, Pagination, PaginationParams,
    PostDraft, PostForm,
};

/// Only admins post here
const NOTICE_CATEGORY: &str = "notice";

#[derive(Debug, Serialize)]
pub struct ViewCount {
    pub view_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

fn check_category(draft: &PostDraft, is_admin: bool) -> Result<(), ApiError> {
    if draft.category.as_str() == NOTICE_CATEGORY && !is_admin {
        return Err(ApiError::Forbidden {
            reason: "only admins can post notices".into(),
        });
    }
    Ok(())
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForumListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<ForumPost>>>, ApiError> {
    let filter = ForumFilter::try_from(params)?;
    let page = ForumRepo::new(&state.pool)
        .list(&filter, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<ForumPost>>, ApiError> {
    Ok(ok(ForumRepo::new(&state.pool).get(id).await?))
}

/// POST /api/forum/{id}/view
///
/// Anonymous viewers count too; a token only adds the viewer to the log line.
async fn increment_view(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    OptionalUser(viewer): OptionalUser,
) -> Result<Json<Envelope<ViewCount>>, ApiError> {
    let view_count = ForumRepo::new(&state.pool).increment_view(id).await?;
    tracing::debug!(
        post_id = %id,
        viewer = ?viewer.as_ref().map(|u| u.id),
        view_count,
        "forum post viewed"
    );
    Ok(ok(ViewCount { view_count }))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(form): Json<PostForm>,
) -> Result<(StatusCode, Json<Envelope<ForumPost>>), ApiError> {
    let draft = form.validate()?;
    check_category(&draft, user.is_admin())?;
    Ok(created(ForumRepo::new(&state.pool).create(user.id, &draft).await?))
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(form): Json<PostForm>,
) -> Result<Json<Envelope<ForumPost>>, ApiError> {
    let draft = form.validate()?;
    check_category(&draft, user.is_admin())?;
    Ok(ok(ForumRepo::new(&state.pool).update(id, user.id, &draft).await?))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    ForumRepo::new(&state.pool).delete(id, user.id).await?;
    Ok(ok(Deleted { deleted: true }))
}

/// GET /api/forum/{id}/comments - oldest first
async fn list_comments(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<Vec<Comment>>>, ApiError> {
    Ok(ok(ForumRepo::new(&state.pool).list_comments(id).await?))
}

async fn add_comment(
    State(state): State<Arc<AppState>>,
    ValidUuid(post_id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Envelope<Comment>>), ApiError> {
    let content = CommentContent::new(&req.content)?;
    let comment = ForumRepo::new(&state.pool)
        .add_comment(post_id, user.id, &content)
        .await?;
    Ok(created(comment))
}

async fn delete_comment(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    ForumRepo::new(&state.pool).delete_comment(id, user.id).await?;
    Ok(ok(Deleted { deleted: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/forum", get(list_posts).post(create_post))
        .route(
            "/api/forum/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/forum/{id}/view", post(increment_view))
        .route(
            "/api/forum/{id}/comments",
            get(list_comments).post(add_comment),
        )
        .route("/api/forum/comments/{id}", delete(delete_comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::token_for;
    use crate::db::repos::users::test_support::insert_user;
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::{db_state, lazy_state};
    use crate::models::Role;
    use axum::http::Method;
    use serde_json::json;

    #[test]
    fn notices_are_admin_only() {
        let draft = PostForm {
            category: "notice".into(),
            title: "공지".into(),
            content: "점검 안내".into(),
        }
        .validate()
        .unwrap();
        assert!(check_category(&draft, false).is_err());
        assert!(check_category(&draft, true).is_ok());
    }

    #[tokio::test]
    async fn view_with_bad_id_is_error_envelope() {
        let (status, body) = send(
            build_router(lazy_state()),
            Method::POST,
            "/api/forum/123/view",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn view_counter_increments_with_or_without_token() {
        let state = db_state().await;
        let author = insert_user(&state.pool, Role::User).await;
        let token = token_for(Some(&author.email), None, 600);

        let (_, body) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/forum",
            Some(&token),
            Some(json!({"category": "free", "title": "안녕하세요", "content": "첫 글입니다"})),
        )
        .await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let uri = format!("/api/forum/{id}/view");

        let (status, body) = send(build_router(state.clone()), Method::POST, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success", "data": {"view_count": 1}}));

        let (_, body) = send(build_router(state), Method::POST, &uri, Some(&token), None).await;
        assert_eq!(body["data"]["view_count"], 2);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn view_of_missing_post_is_404() {
        let state = db_state().await;
        let (status, body) = send(
            build_router(state),
            Method::POST,
            &format!("/api/forum/{}/view", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"status": "error", "message": "post not found"}));
    }
}
