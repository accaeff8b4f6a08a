//! In-process stores backed by `tokio::sync::RwLock` maps.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostStore, StoreError, UserStore};
use crate::models::post::{NewPost, Post};
use crate::models::user::{normalize_email, NewUser, User};

#[derive(Default)]
pub struct InMemoryUserStore {
    // keyed by normalized email
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let key = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        let row = User {
            id: Uuid::new_v4(),
            email: key.clone(),
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(key, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&normalize_email(email)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.id == id)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Post>, u64), StoreError> {
        let posts = self.posts.read().await;
        let mut all: Vec<&Post> = posts.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((page, posts.len() as u64))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, StoreError> {
        let now = Utc::now();
        let row = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator_id: post.creator_id,
            created_at: now,
            updated_at: now,
        };
        self.posts.write().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        title: String,
        content: String,
        image_url: Option<String>,
    ) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = title;
        post.content = content;
        post.image_url = image_url;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        }
    }

    #[tokio::test]
    async fn user_email_is_unique_ignoring_case() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        assert!(matches!(
            store.insert(new_user("A@x.COM")).await,
            Err(StoreError::Duplicate)
        ));
        let found = store.find_by_email("A@X.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(store.find_by_id(user.id).await.unwrap().unwrap().email, "a@x.com");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn posts_page_newest_first() {
        let store = InMemoryPostStore::new();
        let author = Uuid::new_v4();
        let mut ids = Vec::new();
        for i in 0..3 {
            let post = store
                .insert(NewPost {
                    title: format!("title {i}"),
                    content: "content".to_string(),
                    image_url: None,
                    creator_id: author,
                })
                .await
                .unwrap();
            ids.push(post.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        let (page, total) = store.list(0, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.iter().map(|p| p.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);

        assert!(store.delete(ids[0]).await.unwrap());
        assert!(!store.delete(ids[0]).await.unwrap());
        assert!(store
            .update(ids[0], "t".into(), "c".into(), None)
            .await
            .unwrap()
            .is_none());
    }
}
