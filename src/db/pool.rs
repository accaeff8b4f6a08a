//! PostgreSQL connection pool and schema bootstrap.

use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

pub type DbPool = sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL,
        name          TEXT NOT NULL,
        password_hash TEXT NOT NULL CHECK (password_hash <> ''),
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_idx ON users (LOWER(email))",
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id          UUID PRIMARY KEY,
        title       TEXT NOT NULL,
        content     TEXT NOT NULL,
        image_url   TEXT,
        creator_id  UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS posts_created_at_idx ON posts (created_at DESC)",
];

/// Create tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
