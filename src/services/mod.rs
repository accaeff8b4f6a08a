//! Business logic: live-connection registry, fan-out, and the feed.

pub mod feed;
pub mod notifier;
pub mod registry;

pub use feed::FeedService;
pub use notifier::Notifier;
pub use registry::{Connection, ConnectionHandle, ConnectionRegistry};
