//! Bookmark endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{Bookmark, BookmarkRepo};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::{BookmarkKind, Paginated, Pagination, PaginationParams};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub kind: String,
    pub target_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Toggled {
    pub bookmarked: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub kind: Option<String>,
}

/// GET /api/bookmarks?kind=job
async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Bookmark>>>, ApiError> {
    let kind = params
        .kind
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .map(BookmarkKind::parse)
        .transpose()?;

    let page = BookmarkRepo::new(&state.pool)
        .list(user.id, kind, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

/// POST /api/bookmarks/toggle
async fn toggle(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<Envelope<Toggled>>, ApiError> {
    let kind = BookmarkKind::parse(&req.kind)?;
    let bookmarked = BookmarkRepo::new(&state.pool)
        .toggle(user.id, kind, req.target_id)
        .await?;
    Ok(ok(Toggled { bookmarked }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/bookmarks", get(list_bookmarks))
        .route("/api/bookmarks/toggle", post(toggle))
}

#[cfg(test)]
mod tests {
    use crate::auth::test_support::token_for;
    use crate::db::repos::jobs::test_support::draft;
    use crate::db::repos::users::test_support::insert_user;
    use crate::db::repos::JobRepo;
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::db_state;
    use crate::models::Role;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn toggle_twice_round_trips() {
        let state = db_state().await;
        let user = insert_user(&state.pool, Role::User).await;
        let job = JobRepo::new(&state.pool)
            .create(user.id, &draft("북마크"))
            .await
            .unwrap();
        let token = token_for(Some(&user.email), None, 600);
        let payload = json!({"kind": "job", "targetId": job.id});

        let (_, body) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/bookmarks/toggle",
            Some(&token),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(body["data"]["bookmarked"], true);

        let (_, body) = send(
            build_router(state),
            Method::POST,
            "/api/bookmarks/toggle",
            Some(&token),
            Some(payload),
        )
        .await;
        assert_eq!(body["data"]["bookmarked"], false);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_kind_is_400() {
        let state = db_state().await;
        let user = insert_user(&state.pool, Role::User).await;
        let token = token_for(Some(&user.email), None, 600);
        let (status, _) = send(
            build_router(state),
            Method::GET,
            "/api/bookmarks?kind=hospital",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
