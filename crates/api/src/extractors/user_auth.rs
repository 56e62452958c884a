//! JWT authentication extractor.
//!
//! Validates the Bearer token in the Authorization header and exposes the
//! authenticated user to handlers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user derived from the JWT subject claim.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let jwt = JwtConfig::with_leeway(
            &state.config.jwt.secret,
            state.config.jwt.token_expiry_secs,
            state.config.jwt.leeway_secs,
        );

        let user_id = jwt
            .user_id_from_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(CurrentUser { user_id })
    }
}
