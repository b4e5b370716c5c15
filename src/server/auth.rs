//! Bearer-token authentication extractor

use crate::db::sqlite::models::User;
use crate::error::AppError;
use crate::server::types::ApiError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

/// Authenticated caller, resolved from the `Authorization: Bearer`
/// header against the sessions table.
pub struct AuthUser {
    pub user: User,
    /// Hash of the presenting token, kept so logout can revoke it
    pub token_hash: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Auth("Missing Authorization header".to_string()))?;

        let token = parse_bearer(header)
            .ok_or_else(|| AppError::Auth("Malformed Authorization header".to_string()))?;

        let token_hash = state.security.hash_token(token);

        let user = state
            .db
            .user_for_token(&token_hash)
            .map_err(ApiError::from)?
            .ok_or_else(|| AppError::Auth("Invalid or expired token".to_string()))?;

        Ok(AuthUser { user, token_hash })
    }
}

/// Extract the token from a `Bearer <token>` header value
pub fn parse_bearer(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("Bearer  spaced "), Some("spaced"));
    }

    #[test]
    fn test_parse_bearer_rejects_other_schemes() {
        assert!(parse_bearer("Basic abc123").is_none());
        assert!(parse_bearer("abc123").is_none());
        assert!(parse_bearer("Bearer ").is_none());
        assert!(parse_bearer("").is_none());
    }
}
