//! Credential and access gate.
//!
//! Tokens are issued at login and re-validated on every protected call; the
//! only authorization mechanism anywhere is an equality check between the
//! authenticated caller and the resource's declared owner/teacher/student
//! field, performed in the handlers.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::{ApiError, TokenError};
use crate::state::AppState;

pub mod password;
pub mod token;

/// Authenticated caller identity, re-derived from the bearer token on every
/// protected request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Token(TokenError::Malformed))?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Token(TokenError::Malformed))?;

        let claims = token::validate_token(&state.config.auth.secret, token)?;
        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
        })
    }
}
