use axum::extract::State;
use axum::Json;

use crate::auth::{password, token};
use crate::db;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::state::AppState;

/// Replace internal error detail with a generic message on the auth surface.
/// The real failure is logged; the response never carries store or hashing
/// internals.
fn opaque(err: ApiError) -> ApiError {
    match err {
        ApiError::Upstream(detail) => {
            tracing::error!(%detail, "auth operation failed");
            ApiError::Upstream("internal error".to_string())
        }
        other => other,
    }
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    // bcrypt at cost 12 takes long enough to matter on the async runtime
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| opaque(ApiError::Upstream(e.to_string())))?
        .map_err(|e| opaque(ApiError::Upstream(e.to_string())))?;

    let user_id = db::create_user(
        &state.pool,
        &req.username,
        &req.email,
        &password_hash,
        &req.user_type,
    )
    .await
    .map_err(opaque)?;

    tracing::info!(%user_id, "user registered");
    Ok(Json(RegisterResponse {
        success: true,
        user_id,
    }))
}

/// POST /auth/login
///
/// Unknown email and wrong password produce the identical response; the
/// distinction only appears in server logs.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = db::get_user_by_email(&state.pool, &req.email)
        .await
        .map_err(opaque)?
        .ok_or_else(|| {
            tracing::debug!("login failed: unknown email");
            ApiError::InvalidCredential
        })?;

    let hash = user.password_hash.clone();
    let candidate = req.password.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&candidate, &hash))
        .await
        .map_err(|e| opaque(ApiError::Upstream(e.to_string())))?
        .map_err(|e| opaque(ApiError::Upstream(e.to_string())))?;

    if !verified {
        tracing::debug!(user_id = %user.user_id, "login failed: wrong password");
        return Err(ApiError::InvalidCredential);
    }

    let access_token = token::issue_token(
        &state.config.auth.secret,
        &user.email,
        user.user_id,
        state.config.auth.token_ttl_minutes,
    )
    .map_err(|e| opaque(ApiError::Upstream(e.to_string())))?;

    Ok(Json(LoginResponse {
        success: true,
        access_token,
        token_type: "bearer".to_string(),
        username: user.username,
    }))
}
