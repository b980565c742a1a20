//! Bearer token verification
//!
//! Tokens are issued by the external auth service and signed with a shared
//! HS256 secret. The server only verifies them and reads the claims it needs
//! to find the caller in `users`.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the server reads from a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Login email, the primary lookup key
    #[serde(default)]
    pub email: Option<String>,
    /// Subject; a user id for tokens minted by the platform itself
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry (seconds since epoch)
    pub exp: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization token required")]
    MissingToken,

    #[error("malformed authorization header")]
    MalformedHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("user not found")]
    UserNotFound,

    #[error("account is deactivated")]
    Inactive,

    #[error("admin privileges required")]
    NotAdmin,
}

/// Verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let claims = data.claims;
        if claims.email.is_none() && claims.sub.is_none() {
            return Err(AuthError::InvalidToken(
                "token carries neither email nor subject".to_string(),
            ));
        }
        Ok(claims)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Returns `Ok(None)` when the header is absent.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedHeader)?;

    Ok(Some(token))
}
