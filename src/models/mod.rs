//! Data models: users, posts, feed events.

pub mod event;
pub mod post;
pub mod user;

pub use event::*;
pub use post::*;
pub use user::*;
