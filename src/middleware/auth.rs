//! Bearer-token extractor for authenticated routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, NOT_AUTHENTICATED};
use crate::handlers::http::AppState;

/// Extractor: identity from a verified `Authorization: Bearer <token>` header.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state)
            .await
            .ok_or_else(|| AppError::Unauthorized(NOT_AUTHENTICATED.to_string()))?;
        let claims = state.tokens().verify(&token).map_err(|e| {
            debug!(error = %e, "rejected bearer token");
            AppError::from(e)
        })?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// Raw bearer token from the request, if one is present and well-formed.
pub async fn bearer_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(auth)| auth.token().to_string())
}
