//! Current-user profile.

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::AuthUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

/// GET /user/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let row = state
        .users()
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
    Ok(Json(ProfileResponse {
        user_id: row.id,
        email: row.email,
        name: row.name,
    }))
}
