//! Feed-change events and the messages pushed to real-time clients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to a feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedAction {
    Created,
    Updated,
    Deleted,
}

/// Identity of the feed item an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemRef {
    pub id: Uuid,
    pub author_id: Uuid,
}

/// A feed-change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub action: FeedAction,
    pub item: FeedItemRef,
}

impl FeedEvent {
    pub fn new(action: FeedAction, item_id: Uuid, author_id: Uuid) -> Self {
        Self {
            action,
            item: FeedItemRef {
                id: item_id,
                author_id,
            },
        }
    }
}

/// Server-to-client frames on the real-time channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: Uuid },
    FeedEvent {
        action: FeedAction,
        item: FeedItemRef,
    },
}

impl From<FeedEvent> for ServerMessage {
    fn from(event: FeedEvent) -> Self {
        ServerMessage::FeedEvent {
            action: event.action,
            item: event.item,
        }
    }
}
