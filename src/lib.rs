//! Authenticated feed backend with real-time fan-out.
//!
//! Users sign up and log in for a bearer token, post feed items, and every
//! open WebSocket receives a `feed-event` frame whenever a post changes.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{ConnectionRegistry, FeedService, Notifier};

use axum::routing::{get, post};
use handlers::{feed, http, user};

/// Build the API router (auth, feed, user, ws, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login));

    let feed_routes = axum::Router::new()
        .route("/posts", get(feed::list_posts))
        .route("/post", post(feed::create_post))
        .route(
            "/post/:id",
            get(feed::get_post)
                .put(feed::update_post)
                .delete(feed::delete_post),
        );

    axum::Router::new()
        .route("/ws", get(handlers::ws_handler))
        .route("/health", get(http::health))
        .route("/user/me", get(user::me))
        .nest("/auth", auth_routes)
        .nest("/feed", feed_routes)
        .with_state(state)
}
