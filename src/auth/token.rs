use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;

/// Identity claims carried by an access token. Tokens are stateless: nothing
/// is persisted server-side, and expiry is evaluated at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email
    pub sub: String,
    pub user_id: Uuid,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Sign a new access token for the given identity.
pub fn issue_token(
    secret: &str,
    email: &str,
    user_id: Uuid,
    ttl_minutes: i64,
) -> Result<String, TokenError> {
    let exp = (Utc::now() + Duration::minutes(ttl_minutes)).timestamp();
    let claims = Claims {
        sub: email.to_string(),
        user_id,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| TokenError::Malformed)
}

/// Verify signature and expiry, returning the embedded identity claims.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        _ => TokenError::Malformed,
    })
}
