//! Feed posts: CRUD with owner checks, announcing every change to live clients.

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{field_violations, AppError, AppResult};
use crate::models::event::{FeedAction, FeedEvent};
use crate::models::post::{NewPost, Post, PostInput, PostPage};
use crate::repositories::PostStore;
use crate::services::notifier::Notifier;

pub const DEFAULT_PER_PAGE: u32 = 2;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostStore>,
    notifier: Notifier,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostStore>, notifier: Notifier) -> Self {
        Self { posts, notifier }
    }

    /// One page of posts, newest first. Pages start at 1.
    pub async fn list(&self, page: u32, per_page: u32) -> AppResult<PostPage> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let offset = u64::from(page - 1) * u64::from(per_page);
        let (posts, total_items) = self.posts.list(offset, u64::from(per_page)).await?;
        Ok(PostPage { posts, total_items })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Post> {
        self.posts.get(id).await?.ok_or_else(not_found)
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, author: Uuid, input: PostInput) -> AppResult<Post> {
        let input = validated(input)?;
        let post = self
            .posts
            .insert(NewPost {
                title: input.title,
                content: input.content,
                image_url: input.image_url,
                creator_id: author,
            })
            .await?;
        info!(post_id = %post.id, "post created");
        self.notifier
            .broadcast(FeedEvent::new(FeedAction::Created, post.id, author));
        Ok(post)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, actor: Uuid, id: Uuid, input: PostInput) -> AppResult<Post> {
        let input = validated(input)?;
        let existing = self.get(id).await?;
        ensure_owner(&existing, actor)?;
        let post = self
            .posts
            .update(id, input.title, input.content, input.image_url)
            .await?
            .ok_or_else(not_found)?;
        info!(post_id = %post.id, "post updated");
        self.notifier
            .broadcast(FeedEvent::new(FeedAction::Updated, post.id, post.creator_id));
        Ok(post)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> AppResult<()> {
        let existing = self.get(id).await?;
        ensure_owner(&existing, actor)?;
        if !self.posts.delete(id).await? {
            return Err(not_found());
        }
        info!(post_id = %id, "post deleted");
        self.notifier
            .broadcast(FeedEvent::new(FeedAction::Deleted, id, existing.creator_id));
        Ok(())
    }
}

fn validated(input: PostInput) -> AppResult<PostInput> {
    let input = input.normalized();
    input
        .validate()
        .map_err(|e| AppError::validation(field_violations(&e)))?;
    Ok(input)
}

fn ensure_owner(post: &Post, actor: Uuid) -> AppResult<()> {
    if post.creator_id != actor {
        return Err(AppError::Forbidden("Not authorized.".to_string()));
    }
    Ok(())
}

fn not_found() -> AppError {
    AppError::NotFound("Could not find post.".to_string())
}
