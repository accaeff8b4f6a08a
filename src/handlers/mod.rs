//! HTTP and WebSocket request handlers.

pub mod extract;
pub mod feed;
pub mod http;
pub mod user;
pub mod ws;

pub use http::*;
pub use ws::*;
