//! Post store on PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::models::post::{NewPost, Post};
use crate::repositories::{PostStore, StoreError};

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    image_url: Option<String>,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, title, content, image_url, creator_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgPostStore {
    pool: DbPool,
}

impl PgPostStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Post>, u64), StoreError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*)::bigint FROM posts")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2"
        ))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok((rows.into_iter().map(Post::from).collect(), total.max(0) as u64))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(&format!("SELECT {COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Post::from))
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (id, title, content, image_url, creator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.creator_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        title: String,
        content: String,
        image_url: Option<String>,
    ) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET title = $2, content = $3, image_url = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let r = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }
}
