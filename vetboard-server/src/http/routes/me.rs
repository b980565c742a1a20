//! Current user endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::repos::{User, UserRepo};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::AuthUser;
use crate::http::server::AppState;
use crate::models::ProfileForm;

/// GET /api/me
async fn get_me(AuthUser(user): AuthUser) -> Json<Envelope<User>> {
    ok(user)
}

/// PUT /api/me - update name and phone
async fn update_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(form): Json<ProfileForm>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let profile = form.validate()?;
    let updated = UserRepo::new(&state.pool)
        .update_profile(user.id, profile)
        .await?;
    Ok(ok(updated))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me).put(update_me))
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
    async fn requires_token() {
        let (status, body) =
            send(build_router(lazy_state()), Method::GET, "/api/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn profile_update_round_trips() {
        let state = db_state().await;
        let user = insert_user(&state.pool, Role::User).await;
        let token = token_for(Some(&user.email), None, 600);

        let (status, body) = send(
            build_router(state.clone()),
            Method::PUT,
            "/api/me",
            Some(&token),
            Some(json!({"name": "새 이름", "phone": "010-1234-5678"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "새 이름");

        let (_, body) = send(build_router(state), Method::GET, "/api/me", Some(&token), None).await;
        assert_eq!(body["data"]["phone"], "010-1234-5678");
    }
}
