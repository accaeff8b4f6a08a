//! User identity record.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stored user. Emails are kept lower-cased; `password_hash` is a PHC string.
#[derive(Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload for the credential store.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Canonical form of an email address used as the natural key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
