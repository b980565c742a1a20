//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{bearer_token, AuthError};
use crate::db::repos::{User, UserRepo};
use crate::models::ValidationError;

/// Extract and validate a UUID from path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let uuid = Uuid::parse_str(&id).map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "invalid UUID format",
            })
        })?;

        Ok(Self(uuid))
    }
}

/// Resolve the caller from the `Authorization` header.
///
/// Verifies the token, finds the account, and rejects deactivated accounts.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers)?.ok_or(AuthError::MissingToken)?;
    let claims = state.verifier.verify(token)?;

    let user = UserRepo::new(&state.pool)
        .resolve(&claims)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if !user.is_active {
        tracing::info!(user_id = %user.id, "rejected deactivated account");
        return Err(AuthError::Inactive.into());
    }
    Ok(user)
}

/// Signed-in, active caller
pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, &parts.headers).await.map(Self)
    }
}

/// Caller if a usable token was sent, otherwise anonymous.
pub struct OptionalUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(axum::http::header::AUTHORIZATION) {
            return Ok(Self(None));
        }
        match authenticate(state, &parts.headers).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(ApiError::Auth(e)) => {
                tracing::debug!("treating caller as anonymous: {}", e);
                Ok(Self(None))
            }
            Err(e) => Err(e),
        }
    }
}

/// Signed-in caller with the admin role
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(state, &parts.headers).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "non-admin tried an admin route");
            return Err(AuthError::NotAdmin.into());
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::token_for;
    use crate::http::server::test_support::lazy_state;
    use axum::http::header::AUTHORIZATION;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn missing_header_is_rejected_before_the_database() {
        let state = lazy_state();
        let err = authenticate(&state, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::MissingToken)));
    }

    #[tokio::test]
    async fn wrongly_signed_token_is_rejected() {
        let state = lazy_state();
        let forged = {
            use jsonwebtoken::{encode, EncodingKey, Header};
            let claims = crate::auth::Claims {
                email: Some("a@b.kr".into()),
                sub: None,
                exp: usize::MAX / 2,
            };
            encode(&Header::default(), &claims, &EncodingKey::from_secret(b"other")).unwrap()
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {forged}")).unwrap(),
        );

        let err = authenticate(&state, &headers).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let state = lazy_state();
        let token = token_for(Some("a@b.kr"), None, -3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let err = authenticate(&state, &headers).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::InvalidToken(_))));
    }
}
