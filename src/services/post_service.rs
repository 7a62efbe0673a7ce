use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::{require_authenticated, require_owner, AuthContext};
use crate::database::{IdentityRepository, Owner, Post, PostRepository, PostWithOwner, Store};
use crate::error::ApiError;
use crate::pagination::{Page, Paginated};
use crate::storage::FileDisposer;
use crate::validation::{has_min_length, Validator};

pub const MIN_TITLE_LENGTH: usize = 5;
pub const MIN_CONTENT_LENGTH: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePostInput {
    pub title: String,
    pub content: String,
    /// Kept unchanged when absent or blank
    pub image_url: Option<String>,
}

/// Post CRUD with owner-only mutation.
///
/// Every operation checks, in order: authentication, existence, ownership,
/// input, and only then touches storage.
pub struct PostService {
    store: Arc<dyn Store>,
    files: Arc<dyn FileDisposer>,
    posts_per_page: u32,
}

fn validate_post(title: &str, content: &str) -> Result<(), ApiError> {
    let mut validator = Validator::new();
    validator
        .check(has_min_length(title, MIN_TITLE_LENGTH), "title", "Title is invalid.")
        .check(has_min_length(content, MIN_CONTENT_LENGTH), "content", "Content is invalid.");
    validator.finish()
}

fn post_not_found() -> ApiError {
    ApiError::not_found("Could not find post.")
}

/// Ids that do not parse cannot name an existing post
fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| post_not_found())
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, files: Arc<dyn FileDisposer>, posts_per_page: u32) -> Self {
        Self {
            store,
            files,
            posts_per_page,
        }
    }

    pub async fn list_posts(&self, ctx: &AuthContext, page: Option<i64>) -> Result<Paginated<PostWithOwner>, ApiError> {
        require_authenticated(ctx)?;

        let page = Page::new(page, self.posts_per_page);
        let total_items = self.store.count_posts().await?;
        let items = self.store.find_post_page(page.offset(), page.limit()).await?;

        Ok(Paginated { items, total_items })
    }

    pub async fn create_post(&self, ctx: &AuthContext, input: CreatePostInput) -> Result<PostWithOwner, ApiError> {
        let user_id = require_authenticated(ctx)?;

        let title = input.title.trim();
        let content = input.content.trim();
        validate_post(title, content)?;

        let identity = self.store.find_identity(user_id).await?.ok_or_else(|| {
            error!("Valid token for {} but no such identity", user_id);
            ApiError::inconsistent("Invalid user.")
        })?;

        let post = Post::new(identity.id, title, content, input.image_url.trim());
        self.store.insert_post(&post).await?;

        // The post is already stored; a failure here leaves it without a back-reference
        if let Err(e) = self.store.append_post_id(identity.id, post.id).await {
            error!("Post {} created but owner {} was not updated: {}", post.id, identity.id, e);
            return Err(e.into());
        }

        info!("Created post {} for {}", post.id, identity.id);
        Ok(PostWithOwner {
            owner: Owner {
                id: identity.id,
                name: identity.name,
            },
            post,
        })
    }

    pub async fn get_post(&self, ctx: &AuthContext, post_id: &str) -> Result<PostWithOwner, ApiError> {
        require_authenticated(ctx)?;
        let id = parse_post_id(post_id)?;

        self.store
            .find_post_with_owner(id)
            .await?
            .ok_or_else(post_not_found)
    }

    pub async fn update_post(
        &self,
        ctx: &AuthContext,
        post_id: &str,
        input: UpdatePostInput,
    ) -> Result<PostWithOwner, ApiError> {
        require_authenticated(ctx)?;
        let id = parse_post_id(post_id)?;

        let PostWithOwner { mut post, owner } = self
            .store
            .find_post_with_owner(id)
            .await?
            .ok_or_else(post_not_found)?;
        require_owner(ctx, owner.id)?;

        let title = input.title.trim();
        let content = input.content.trim();
        validate_post(title, content)?;

        post.title = title.to_string();
        post.content = content.to_string();
        let replaced_image = match input.image_url.as_deref().map(str::trim) {
            Some(new_image) if !new_image.is_empty() && new_image != post.image_url => {
                Some(std::mem::replace(&mut post.image_url, new_image.to_string()))
            }
            _ => None,
        };
        post.updated_at = Utc::now();

        self.store.save_post(&post).await?;

        if let Some(old_image) = replaced_image {
            self.dispose_image(&old_image).await;
        }

        info!("Updated post {}", post.id);
        Ok(PostWithOwner { post, owner })
    }

    pub async fn delete_post(&self, ctx: &AuthContext, post_id: &str) -> Result<(), ApiError> {
        let user_id = require_authenticated(ctx)?;
        let id = parse_post_id(post_id)?;

        let post = self.store.find_post(id).await?.ok_or_else(post_not_found)?;
        require_owner(ctx, post.owner_id)?;

        let identity = self
            .store
            .find_identity(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found."))?;

        // Lost a race with another delete of the same post
        if !self.store.delete_post(post.id).await? {
            return Err(post_not_found());
        }

        self.dispose_image(&post.image_url).await;

        self.store.remove_post_id(identity.id, post.id).await?;

        info!("Deleted post {} of {}", post.id, identity.id);
        Ok(())
    }

    /// Best-effort; failures are logged and never propagated. Runs after the
    /// post row is gone or repointed, so any remaining reference belongs to
    /// another post and keeps the file alive.
    async fn dispose_image(&self, image_ref: &str) {
        if image_ref.trim().is_empty() {
            return;
        }
        match self.store.count_posts_with_image(image_ref).await {
            Ok(0) => {}
            Ok(n) => {
                warn!("Keeping image '{}': still referenced by {} post(s)", image_ref, n);
                return;
            }
            Err(e) => {
                warn!("Keeping image '{}': reference check failed: {}", image_ref, e);
                return;
            }
        }
        if let Err(e) = self.files.dispose(image_ref).await {
            warn!("Failed to dispose image '{}': {}", image_ref, e);
        }
    }
}
