//! Entry point: load config, wire dependencies, and run the server.

use feedpulse::auth::{PasswordHasher, TokenIssuer};
use feedpulse::config::Config;
use feedpulse::db;
use feedpulse::middleware::{cors_layer, harden, request_span};
use feedpulse::repositories::memory::{InMemoryPostStore, InMemoryUserStore};
use feedpulse::repositories::{PostStore, UserStore};
use feedpulse::{create_app, AppState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (users, posts): (Arc<dyn UserStore>, Arc<dyn PostStore>) = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::init_schema(&pool).await?;
            (
                Arc::new(db::PgUserStore::new(pool.clone())),
                Arc::new(db::PgPostStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on exit)");
            (
                Arc::new(InMemoryUserStore::new()),
                Arc::new(InMemoryPostStore::new()),
            )
        }
    };

    let tokens = TokenIssuer::new(config.jwt_secret.as_bytes());
    let state = AppState::new(
        users,
        posts,
        PasswordHasher::new()?,
        tokens,
        config.token_ttl,
    );

    let app = harden(create_app(state))
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http().make_span_with(request_span::<axum::body::Body>));

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
