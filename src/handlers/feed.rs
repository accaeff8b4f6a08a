//! Feed HTTP handlers. All routes require a bearer token.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::extract::{AppJson, AppPath, AppQuery};
use crate::handlers::http::AppState;
use crate::middleware::AuthUser;
use crate::models::post::{Post, PostInput, PostPage};
use crate::services::feed::DEFAULT_PER_PAGE;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PostEnvelope {
    pub message: &'static str,
    pub post: Post,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub page: PostPage,
}

/// GET /feed/posts
pub async fn list_posts(
    State(state): State<AppState>,
    _user: AuthUser,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<PostsResponse>, AppError> {
    let page = state
        .feed()
        .list(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
        .await?;
    Ok(Json(PostsResponse {
        message: "Fetched posts successfully.",
        page,
    }))
}

/// POST /feed/post
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(body): AppJson<PostInput>,
) -> Result<(StatusCode, Json<PostEnvelope>), AppError> {
    let post = state.feed().create(user.user_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(PostEnvelope {
            message: "Post created successfully!",
            post,
        }),
    ))
}

/// GET /feed/post/:id
pub async fn get_post(
    State(state): State<AppState>,
    _user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<PostEnvelope>, AppError> {
    let post = state.feed().get(id).await?;
    Ok(Json(PostEnvelope {
        message: "Post fetched.",
        post,
    }))
}

/// PUT /feed/post/:id
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<PostInput>,
) -> Result<Json<PostEnvelope>, AppError> {
    let post = state.feed().update(user.user_id, id, body).await?;
    Ok(Json(PostEnvelope {
        message: "Post updated!",
        post,
    }))
}

/// DELETE /feed/post/:id
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.feed().delete(user.user_id, id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted post." })))
}
