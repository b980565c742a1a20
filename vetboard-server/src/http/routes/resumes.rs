//! Public résumé browsing

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::repos::{PublicResumeSummary, Resume, ResumeRepo};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams, ResumeFilter, ResumeListParams};

/// GET /api/resumes - public résumés, most recently updated first
async fn list_resumes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResumeListParams>,
    Query(paging): Query<PaginationParams>,
) -> Result<Json<Envelope<Paginated<PublicResumeSummary>>>, ApiError> {
    let filter = ResumeFilter::try_from(params)?;
    let page = ResumeRepo::new(&state.pool)
        .list_public(&filter, Pagination::from(paging))
        .await?;
    Ok(ok(page))
}

/// GET /api/resumes/{id} - a public résumé; private ones are 404
async fn get_resume(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Envelope<Resume>>, ApiError> {
    let resume = ResumeRepo::new(&state.pool).view_public(id).await?;
    Ok(ok(resume))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/resumes", get(list_resumes))
        .route("/api/resumes/{id}", get(get_resume))
}

#[cfg(test)]
mod tests {
    use crate::http::routes::test_support::send;
    use crate::http::server::build_router;
    use crate::http::server::test_support::lazy_state;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn bad_id_is_400() {
        let (status, body) = send(
            build_router(lazy_state()),
            Method::GET,
            "/api/resumes/not-a-uuid",
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "id: invalid UUID format");
    }
}
