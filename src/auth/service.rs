//! Auth application service: signup and login over the credential store.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::jwt::{Identity, TokenIssuer};
use crate::auth::password::PasswordHasher;
use crate::error::{field_violations, FieldViolation};
use crate::models::user::{normalize_email, NewUser};
use crate::repositories::{StoreError, UserStore};

/// The only message a failed login ever produces.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Outcomes of the auth service. Lower-level errors never cross this boundary raw.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed.")]
    ValidationFailed(Vec<FieldViolation>),
    #[error("Invalid credentials.")]
    Unauthorized,
    #[error("Email address already exists.")]
    Conflict,
    #[error("internal error: {0}")]
    Internal(anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AuthError::Conflict,
            StoreError::Backend(e) => AuthError::Internal(e),
        }
    }
}

/// Signup input. Absent fields deserialize empty so `validate` reports them.
#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NewAccount {
    #[validate(
        email(message = "Please enter a valid email."),
        length(max = 255, message = "Email is too long.")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Name must not be empty."))]
    pub name: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters."))]
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl NewAccount {
    fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self.name = self.name.trim().to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            token_ttl,
        }
    }

    /// Create an account. Validation runs before any hashing or store work.
    #[instrument(skip_all, fields(email = %account.email))]
    pub async fn signup(&self, account: NewAccount) -> Result<Uuid, AuthError> {
        let account = account.normalized();
        account
            .validate()
            .map_err(|e| AuthError::ValidationFailed(field_violations(&e)))?;

        let password_hash = self.hash_password(account.password).await?;
        let new_user = NewUser {
            email: account.email,
            name: account.name,
            password_hash,
        };

        let user = self.users.insert(new_user).await.map_err(|e| {
            debug!(error = %e, "signup insert rejected");
            AuthError::from(e)
        })?;
        info!(user_id = %user.id, "user created");
        Ok(user.id)
    }

    /// Exchange credentials for a session token. Unknown email and wrong
    /// password are indistinguishable to the caller.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let matches = self.verify_password(password.to_owned(), stored_hash).await?;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                debug!("login rejected");
                return Err(AuthError::Unauthorized);
            }
        };

        let identity = Identity {
            user_id: user.id,
            email: user.email,
        };
        let token = self.tokens.issue(&identity, self.token_ttl).map_err(|e| {
            warn!(error = %e, "token issue failed");
            AuthError::Internal(e.into())
        })?;
        info!(user_id = %identity.user_id, "user logged in");
        Ok(Session {
            token,
            user_id: identity.user_id,
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("hash task: {}", e)))?
            .map_err(|e| AuthError::Internal(e.into()))
    }

    async fn verify_password(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AuthError::Internal(anyhow::anyhow!("verify task: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::DEFAULT_TOKEN_TTL;
    use crate::models::user::User;
    use crate::repositories::memory::InMemoryUserStore;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    const SECRET: &[u8] = b"test-jwt-secret-min-32-chars!!!!";

    fn service_with(users: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(
            users,
            PasswordHasher::with_cost(1024, 1, 1).unwrap(),
            TokenIssuer::new(SECRET),
            DEFAULT_TOKEN_TTL,
        )
    }

    fn account(email: &str, password: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            name: "A".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn signup_then_login_yields_token_for_same_email() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        let user_id = auth.signup(account("a@x.com", "secret123")).await.unwrap();

        let session = auth.login("a@x.com", "secret123").await.unwrap();
        assert_eq!(session.user_id, user_id);

        let claims = TokenIssuer::new(SECRET).verify(&session.token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.sub, user_id);
    }

    #[tokio::test]
    async fn login_email_is_case_insensitive() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        assert_ok!(auth.signup(account("Mixed@Case.com", "secret123")).await);
        assert_ok!(auth.login("mixed@case.COM", "secret123").await);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        assert_ok!(auth.signup(account("a@x.com", "secret123")).await);
        let err = auth.signup(account("A@X.COM", "other-pass")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_signups_admit_exactly_one() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let auth = auth.clone();
                let email = if i % 2 == 0 { "race@x.com" } else { "RACE@x.com" };
                tokio::spawn(async move { auth.signup(account(email, "secret123")).await })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AuthError::Conflict) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        assert_ok!(auth.signup(account("a@x.com", "secret123")).await);

        let unknown = auth.login("nobody@x.com", "secret123").await.unwrap_err();
        let wrong = auth.login("a@x.com", "not-the-password").await.unwrap_err();
        assert!(matches!(unknown, AuthError::Unauthorized));
        assert!(matches!(wrong, AuthError::Unauthorized));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn invalid_input_fails_before_touching_store() {
        let store = Arc::new(InMemoryUserStore::new());
        let auth = service_with(store.clone());

        let err = auth.signup(account("not-an-email", "short")).await.unwrap_err();
        match err {
            AuthError::ValidationFailed(list) => {
                let fields: Vec<&str> = list.iter().map(|v| v.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let auth = service_with(Arc::new(InMemoryUserStore::new()));
        let mut input = account("a@x.com", "secret123");
        input.name = "   ".to_string();
        assert!(matches!(
            auth.signup(input).await,
            Err(AuthError::ValidationFailed(_))
        ));
    }

    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn insert(&self, _user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal() {
        let auth = service_with(Arc::new(BrokenStore));
        assert!(matches!(
            auth.signup(account("a@x.com", "secret123")).await,
            Err(AuthError::Internal(_))
        ));
        let err = assert_err!(auth.login("a@x.com", "secret123").await);
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
