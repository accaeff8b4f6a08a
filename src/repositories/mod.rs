//! Store seams: the credential store and the post store.
//!
//! Postgres implementations live in [`crate::db`]; [`memory`] holds the
//! in-process ones used by tests and database-less runs.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (user email) is already taken.
    #[error("duplicate key")]
    Duplicate,
    #[error("store backend: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Backend(err.into())
    }
}

/// Durable user records. Emails arrive normalized; uniqueness is enforced here.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Durable feed posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest first, plus the total count.
    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Post>, u64), StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    async fn insert(&self, post: NewPost) -> Result<Post, StoreError>;
    /// `None` when the post no longer exists.
    async fn update(
        &self,
        id: Uuid,
        title: String,
        content: String,
        image_url: Option<String>,
    ) -> Result<Option<Post>, StoreError>;
    /// `false` when there was nothing to delete.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
