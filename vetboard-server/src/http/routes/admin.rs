//! Admin back-office: analytics, user management, content moderation
//!
//! Every handler takes `AdminUser`, so non-admins get 403 before any query runs.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::repos::{ModerationRepo, SiteStats, StatsRepo, User, UserRepo};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{ModeratedKind, Paginated, Pagination, PaginationParams, ValidationError};

#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct HiddenRequest {
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct Moderated {
    pub kind: &'static str,
    pub id: Uuid,
    pub hidden: Option<bool>,
    pub deleted: bool,
}

/// Parse `/{kind}/{id}` for moderation routes.
fn content_target(kind: &str, id: &str) -> Result<(ModeratedKind, Uuid), ApiError> {
    let kind = ModeratedKind::from_segment(kind)?;
    let id = Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id",
        reason: "invalid UUID format",
    })?;
    Ok((kind, id))
}

async fn stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Envelope<SiteStats>>, ApiError> {
    Ok(ok(StatsRepo::new(&state.pool).summary().await?))
}

/// GET /api/admin/users?keyword=
async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<UserListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<User>>>, ApiError> {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let page = UserRepo::new(&state.pool)
        .list(keyword, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

async fn set_user_active(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AdminUser(admin): AdminUser,
    Json(req): Json<ActiveRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    if id == admin.id && !req.active {
        return Err(ApiError::Conflict {
            message: "admins cannot deactivate themselves".into(),
        });
    }
    let user = UserRepo::new(&state.pool).set_active(id, req.active).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, active = req.active, "user activation changed");
    Ok(ok(user))
}

/// PUT /api/admin/content/{kind}/{id}/hidden
async fn set_hidden(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    AdminUser(admin): AdminUser,
    Json(req): Json<HiddenRequest>,
) -> Result<Json<Envelope<Moderated>>, ApiError> {
    let (kind, id) = content_target(&kind, &id)?;
    ModerationRepo::new(&state.pool)
        .set_hidden(kind, id, req.hidden)
        .await?;
    tracing::debug!(admin_id = %admin.id, "moderation applied");
    Ok(ok(Moderated {
        kind: kind.resource(),
        id,
        hidden: Some(req.hidden),
        deleted: false,
    }))
}

async fn delete_content(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Envelope<Moderated>>, ApiError> {
    let (kind, id) = content_target(&kind, &id)?;
    ModerationRepo::new(&state.pool).delete(kind, id).await?;
    tracing::debug!(admin_id = %admin.id, "moderation applied");
    Ok(ok(Moderated {
        kind: kind.resource(),
        id,
        hidden: None,
        deleted: true,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/active", put(set_user_active))
        .route("/api/admin/content/{kind}/{id}/hidden", put(set_hidden))
        .route("/api/admin/content/{kind}/{id}", delete(delete_content))
}
