//! Direct message endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Message, MessageRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{MessageForm, Paginated, Pagination, PaginationParams};

#[derive(Debug, Default, Deserialize)]
pub struct InboxParams {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// GET /api/messages/inbox?unread=true
async fn inbox(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<InboxParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Message>>>, ApiError> {
    let page = MessageRepo::new(&state.pool)
        .inbox(user.id, params.unread, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

async fn sent(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Message>>>, ApiError> {
    let page = MessageRepo::new(&state.pool)
        .sent(user.id, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(form): Json<MessageForm>,
) -> Result<(StatusCode, Json<Envelope<Message>>), ApiError> {
    let draft = form.validate(user.id)?;
    Ok(created(MessageRepo::new(&state.pool).send(user.id, &draft).await?))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<UnreadCount>>, ApiError> {
    let unread = MessageRepo::new(&state.pool).unread_count(user.id).await?;
    Ok(ok(UnreadCount { unread }))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Message>>, ApiError> {
    Ok(ok(MessageRepo::new(&state.pool).mark_read(id, user.id).await?))
}

async fn delete_message(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    MessageRepo::new(&state.pool).delete(id, user.id).await?;
    Ok(ok(Deleted { deleted: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages", post(send_message))
        .route("/api/messages/inbox", get(inbox))
        .route("/api/messages/sent", get(sent))
        .route("/api/messages/unread-count", get(unread_count))
        .route("/api/messages/{id}/read", post(mark_read))
        .route("/api/messages/{id}", delete(delete_message))
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

    #[tokio::test]
    async fn inbox_requires_auth() {
        let (status, _) = send(
            build_router(lazy_state()),
            Method::GET,
            "/api/messages/inbox",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn send_and_read_flow() {
        let state = db_state().await;
        let alice = insert_user(&state.pool, Role::User).await;
        let bob = insert_user(&state.pool, Role::User).await;
        let alice_token = token_for(Some(&alice.email), None, 600);
        let bob_token = token_for(Some(&bob.email), None, 600);

        let (status, body) = send(
            build_router(state.clone()),
            Method::POST,
            "/api/messages",
            Some(&alice_token),
            Some(json!({"recipientId": bob.id, "content": "이력서 잘 봤습니다."})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            build_router(state.clone()),
            Method::GET,
            "/api/messages/unread-count",
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(body["data"]["unread"], 1);

        let (status, _) = send(
            build_router(state.clone()),
            Method::POST,
            &format!("/api/messages/{id}/read"),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            build_router(state),
            Method::GET,
            "/api/messages/inbox?unread=true",
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(body["data"]["total"], 0);
    }
}
