//! Application error types and their HTTP rendering.
//!
//! Every failure leaves the service as `{ "message": ..., "data"?: ... }` with the
//! status taken from the error kind. Internal causes are logged, never sent.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::{AuthError, TokenError, INVALID_CREDENTIALS};
use crate::repositories::StoreError;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Shared by missing, malformed, foreign and expired tokens.
pub const NOT_AUTHENTICATED: &str = "Not authenticated.";

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Flatten `validator` output into a stable, field-ordered list.
pub fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldViolation {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code)),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    out
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        data: Vec<FieldViolation>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(data: Vec<FieldViolation>) -> Self {
        AppError::Validation {
            message: "Validation failed.".to_string(),
            data,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, data } => json!({ "message": message, "data": data }),
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => json!({ "message": msg }),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                json!({ "message": INTERNAL_MESSAGE })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ValidationFailed(data) => AppError::validation(data),
            AuthError::Unauthorized => AppError::Unauthorized(INVALID_CREDENTIALS.to_string()),
            AuthError::Conflict => AppError::Conflict("Email address already exists.".to_string()),
            AuthError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => {
                AppError::Unauthorized(NOT_AUTHENTICATED.to_string())
            }
            TokenError::Signing(e) => AppError::Internal(anyhow::anyhow!("token signing: {}", e)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::Conflict("Resource already exists.".to_string()),
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // Body text can echo submitted values, so only the status is logged.
        tracing::debug!(status = %rejection.status(), "request body rejected");
        let violation = match &rejection {
            JsonRejection::JsonDataError(e) => match missing_field(&e.body_text()) {
                Some(field) => FieldViolation {
                    field,
                    message: "This field is required.".to_string(),
                },
                None => FieldViolation {
                    field: "body".to_string(),
                    message: "A field has the wrong type.".to_string(),
                },
            },
            JsonRejection::MissingJsonContentType(_) => FieldViolation {
                field: "body".to_string(),
                message: "Expected an application/json body.".to_string(),
            },
            _ => FieldViolation {
                field: "body".to_string(),
                message: "Request body is not valid JSON.".to_string(),
            },
        };
        AppError::validation(vec![violation])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "path rejected");
        AppError::NotFound("Resource not found.".to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "query string rejected");
        AppError::validation(vec![FieldViolation {
            field: "query".to_string(),
            message: "Query parameters are invalid.".to_string(),
        }])
    }
}

/// Field name out of serde's "missing field `x`" message.
fn missing_field(detail: &str) -> Option<String> {
    let rest = detail.split("missing field `").nth(1)?;
    rest.split('`').next().map(str::to_string)
}

pub type AppResult<T> = Result<T, AppError>;
