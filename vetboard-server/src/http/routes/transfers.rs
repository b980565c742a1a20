//! Transfer (양도양수) listing endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Transfer, TransferRepo};
use crate::http::envelope::{created, ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{AuthUser, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    Paginated, Pagination, PaginationParams, TransferFilter, TransferForm, TransferListParams,
    TransferStatus,
};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransferListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Transfer>>>, ApiError> {
    let filter = TransferFilter::try_from(params)?;
    let page = TransferRepo::new(&state.pool)
        .list(&filter, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

/// GET /api/transfers/{id} - counts as a view
async fn get_transfer(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<Transfer>>, ApiError> {
    Ok(ok(TransferRepo::new(&state.pool).view(id).await?))
}

async fn create_transfer(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(form): Json<TransferForm>,
) -> Result<(StatusCode, Json<Envelope<Transfer>>), ApiError> {
    let draft = form.validate()?;
    Ok(created(
        TransferRepo::new(&state.pool).create(user.id, &draft).await?,
    ))
}

async fn update_transfer(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(form): Json<TransferForm>,
) -> Result<Json<Envelope<Transfer>>, ApiError> {
    let draft = form.validate()?;
    Ok(ok(TransferRepo::new(&state.pool)
        .update(id, user.id, &draft)
        .await?))
}

/// PUT /api/transfers/{id}/status - active / reserved / completed
async fn set_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Envelope<Transfer>>, ApiError> {
    let status = TransferStatus::parse(&req.status)?;
    Ok(ok(TransferRepo::new(&state.pool)
        .set_status(id, user.id, status)
        .await?))
}

async fn delete_transfer(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<Deleted>>, ApiError> {
    TransferRepo::new(&state.pool).delete(id, user.id).await?;
    Ok(ok(Deleted { deleted: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/transfers", get(list_transfers).post(create_transfer))
        .route(
            "/api/transfers/{id}",
            get(get_transfer).put(update_transfer).delete(delete_transfer),
        )
        .route("/api/transfers/{id}/status", put(set_status))
}

#[cfg(test)]
mod tests {
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::lazy_state;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn inverted_price_range_is_400() {
        let (status, body) = send(
            build_router(lazy_state()),
            Method::GET,
            "/api/transfers?min_price=500&max_price=100",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn unknown_category_is_400() {
        let (status, _) = send(
            build_router(lazy_state()),
            Method::GET,
            "/api/transfers?category=spaceship",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
