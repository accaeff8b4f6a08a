//! Request middleware: bearer authentication, CORS, response hardening and
//! request spans.

pub mod auth;

pub use auth::AuthUser;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
};
use tracing::Span;

/// Headers added to every response unless a handler already set them.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", "default-src 'self'; frame-ancestors 'self'; object-src 'none'"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Security headers and gzip compression for every route of `router`.
pub fn harden(router: Router) -> Router {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
        .layer(CompressionLayer::new())
}

/// Span for one HTTP request. Only the path is recorded: the query string
/// may carry a token (`/ws?token=`).
pub fn request_span<B>(req: &Request<B>) -> Span {
    tracing::info_span!("request", method = %req.method(), path = %req.uri().path())
}

/// CORS for the browser client at `origin`.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("invalid CORS origin {:?}: {}", origin, e))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::OPTIONS,
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
