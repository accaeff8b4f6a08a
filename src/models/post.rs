//! Feed posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /feed/post` and `PUT /feed/post/:id`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[validate(length(min = 5, message = "Title must be at least 5 characters."))]
    pub title: String,
    #[validate(length(min = 5, message = "Content must be at least 5 characters."))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 2048, message = "Image URL is too long."))]
    pub image_url: Option<String>,
}

impl PostInput {
    /// Trim text fields in place; an empty image URL counts as none.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
        self.image_url = self
            .image_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self
    }
}

/// Insert payload for the post store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub creator_id: Uuid,
}

/// One page of the feed, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_items: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_drops_blank_image() {
        let input = PostInput {
            title: "  Hello world ".into(),
            content: " body text ".into(),
            image_url: Some("   ".into()),
        }
        .normalized();
        assert_eq!(input.title, "Hello world");
        assert_eq!(input.content, "body text");
        assert!(input.image_url.is_none());
    }

    #[test]
    fn short_title_fails_validation() {
        let input = PostInput {
            title: "Hey".into(),
            content: "long enough".into(),
            image_url: None,
        };
        assert!(input.validate().is_err());
    }
}
