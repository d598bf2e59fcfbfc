use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Failure kinds for bearer-token validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token signature invalid")]
    SignatureInvalid,
}

/// Error taxonomy shared by every handler.
///
/// Callers must be able to tell apart "the model was unreachable or errored"
/// (`GenerationCall`, retry the call) from "the model replied with content we
/// could not parse" (`GenerationParse`, retry with a stricter prompt), and
/// "already enrolled" (`Conflict`) from "wrong enrollment code"
/// (`WrongEnrollmentCode`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(&'static str),
    /// Deliberately the same message for unknown email and wrong password
    /// so login responses cannot be used for account enumeration.
    #[error("incorrect email or password")]
    InvalidCredential,
    #[error("incorrect enrollment code for this class")]
    WrongEnrollmentCode,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("upstream service error: {0}")]
    Upstream(String),
    #[error("generation call failed: {0}")]
    GenerationCall(String),
    #[error("model output could not be parsed as structured data")]
    GenerationParse,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::WrongEnrollmentCode => StatusCode::UNAUTHORIZED,
            ApiError::Token(_) => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::GenerationCall(_) => StatusCode::BAD_GATEWAY,
            ApiError::GenerationParse => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "detail": self.to_string() }));

        if matches!(self, ApiError::Token(_)) {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Translate data-access failures at the store boundary: unique-key
/// violations become `Conflict`, missing rows `NotFound`, anything else is
/// an upstream store problem.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("record"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("a record with this key already exists".to_string())
            }
            _ => ApiError::Upstream(err.to_string()),
        }
    }
}
