//! Auth HTTP handlers: signup, login.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::NewAccount;
use crate::error::AppError;
use crate::handlers::extract::AppJson;
use crate::handlers::http::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: Uuid,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<NewAccount>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let user_id = state.auth().signup(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created!".to_string(),
            user_id,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state.auth().login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse {
        token: session.token,
        user_id: session.user_id,
    }))
}
