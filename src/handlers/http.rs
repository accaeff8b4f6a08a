//! Shared application state and the health check.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, PasswordHasher, TokenIssuer};
use crate::repositories::{PostStore, UserStore};
use crate::services::{ConnectionRegistry, FeedService, Notifier};

/// Shared application state for HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub feed: FeedService,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenIssuer,
    pub registry: ConnectionRegistry,
}

impl AppState {
    /// Wire services over the given stores. The registry starts empty.
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Self {
        let registry = ConnectionRegistry::new();
        let notifier = Notifier::new(registry.clone());
        Self {
            auth: AuthService::new(users.clone(), hasher, tokens.clone(), token_ttl),
            feed: FeedService::new(posts, notifier),
            users,
            tokens,
            registry,
        }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
    pub fn feed(&self) -> &FeedService {
        &self.feed
    }
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}

/// GET /health — liveness check.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "feedpulse",
            "connections": state.registry().len()
        })),
    )
}
