use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Identity, Owner, Post, PostWithOwner};
use super::repository::{IdentityRepository, PostRepository, Store};
use super::StoreError;
use crate::pagination;

#[derive(Debug, Default)]
struct Tables {
    identities: HashMap<Uuid, Identity>,
    posts: HashMap<Uuid, Post>,
}

impl Tables {
    fn identity_mut(&mut self, id: Uuid) -> Result<&mut Identity, StoreError> {
        self.identities
            .get_mut(&id)
            .ok_or_else(|| StoreError::Query(format!("identity {} does not exist", id)))
    }

    fn with_owner(&self, post: &Post) -> PostWithOwner {
        let name = self
            .identities
            .get(&post.owner_id)
            .map(|identity| identity.name.clone())
            .unwrap_or_default();
        PostWithOwner {
            post: post.clone(),
            owner: Owner {
                id: post.owner_id,
                name,
            },
        }
    }
}

/// Process-local store used when no database is configured, and by tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.identities.values().find(|i| i.email == email).cloned())
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        Ok(self.tables.read().await.identities.get(&id).cloned())
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.identities.values().any(|i| i.email == identity.email) {
            return Err(StoreError::Conflict(format!("Email '{}' is already registered", identity.email)));
        }
        tables.identities.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn append_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.identity_mut(identity_id)?.add_post(post_id);
        Ok(())
    }

    async fn remove_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.identity_mut(identity_id)?.remove_post(post_id);
        Ok(())
    }

    async fn update_identity_status(&self, identity_id: Uuid, status: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let identity = tables.identity_mut(identity_id)?;
        identity.status = status.to_string();
        identity.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn find_post_with_owner(&self, id: Uuid) -> Result<Option<PostWithOwner>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|post| tables.with_owner(post)))
    }

    async fn count_posts(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().await.posts.len() as u64)
    }

    async fn count_posts_with_image(&self, image_url: &str) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().filter(|p| p.image_url == image_url).count() as u64)
    }

    async fn find_post_page(&self, offset: u64, limit: u64) -> Result<Vec<PostWithOwner>, StoreError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.posts.values().collect();
        // Newest first; id breaks ties so equal timestamps still page deterministically
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        Ok(pagination::slice(posts, offset, limit)
            .into_iter()
            .map(|post| tables.with_owner(post))
            .collect())
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.identities.contains_key(&post.owner_id) {
            return Err(StoreError::Query(format!("owner {} does not exist", post.owner_id)));
        }
        tables.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(())
            }
            None => Err(StoreError::Query(format!("post {} does not exist", post.id))),
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.posts.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
