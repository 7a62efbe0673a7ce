use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Identity, Post, PostWithOwner};
use super::StoreError;

/// Identity persistence. Emails are stored already normalized.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the email is already taken
    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError>;

    /// Append to the owned post ids without touching any other column
    async fn append_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError>;

    async fn remove_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError>;

    async fn update_identity_status(&self, identity_id: Uuid, status: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Loads a post with its owner's display name
    async fn find_post_with_owner(&self, id: Uuid) -> Result<Option<PostWithOwner>, StoreError>;

    async fn count_posts(&self) -> Result<u64, StoreError>;

    /// Number of posts whose image reference is exactly `image_url`
    async fn count_posts_with_image(&self, image_url: &str) -> Result<u64, StoreError>;

    /// Posts ordered newest first, skipping `offset` and returning at most `limit`
    async fn find_post_page(&self, offset: u64, limit: u64) -> Result<Vec<PostWithOwner>, StoreError>;

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError>;

    async fn save_post(&self, post: &Post) -> Result<(), StoreError>;

    /// Returns whether a post was removed
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Everything the services need from persistence
#[async_trait]
pub trait Store: IdentityRepository + PostRepository {
    async fn health_check(&self) -> Result<(), StoreError>;
}
