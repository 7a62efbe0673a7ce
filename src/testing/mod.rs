use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::{Argon2Hasher, AuthContext, TokenService};
use crate::config::PasswordHashConfig;
use crate::database::{
    Identity, IdentityRepository, MemoryStore, Post, PostRepository, PostWithOwner, Store, StoreError,
};
use crate::services::{AccountService, PostService, RegisterInput};
use crate::storage::{FileDisposer, FileError};

pub const TEST_SECRET: &str = "unit-test-secret";
pub const TEST_PASSWORD: &str = "secret1";

/// Records disposed references instead of touching the filesystem
#[derive(Debug, Default)]
pub struct RecordingDisposer {
    disposed: Mutex<Vec<String>>,
    fail_next: AtomicBool,
}

impl RecordingDisposer {
    pub fn disposed(&self) -> Vec<String> {
        self.disposed.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileDisposer for RecordingDisposer {
    async fn dispose(&self, image_ref: &str) -> Result<(), FileError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(FileError::OutsideRoot(image_ref.to_string()));
        }
        self.disposed.lock().unwrap().push(image_ref.to_string());
        Ok(())
    }
}

/// Delegates to a [`MemoryStore`] but can be told to lose identities or fail
/// post-id appends
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    hide_identities: AtomicBool,
    fail_post_id_appends: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// `find_identity` reports nothing from now on
    pub fn hide_identities(&self) {
        self.hide_identities.store(true, Ordering::SeqCst);
    }

    pub fn fail_post_id_appends(&self) {
        self.fail_post_id_appends.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityRepository for FlakyStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        self.inner.find_identity_by_email(email).await
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        if self.hide_identities.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_identity(id).await
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        self.inner.insert_identity(identity).await
    }

    async fn append_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        if self.fail_post_id_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Query("identity write refused".to_string()));
        }
        self.inner.append_post_id(identity_id, post_id).await
    }

    async fn remove_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        self.inner.remove_post_id(identity_id, post_id).await
    }

    async fn update_identity_status(&self, identity_id: Uuid, status: &str) -> Result<(), StoreError> {
        self.inner.update_identity_status(identity_id, status).await
    }
}

#[async_trait]
impl PostRepository for FlakyStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        self.inner.find_post(id).await
    }

    async fn find_post_with_owner(&self, id: Uuid) -> Result<Option<PostWithOwner>, StoreError> {
        self.inner.find_post_with_owner(id).await
    }

    async fn count_posts(&self) -> Result<u64, StoreError> {
        self.inner.count_posts().await
    }

    async fn count_posts_with_image(&self, image_url: &str) -> Result<u64, StoreError> {
        self.inner.count_posts_with_image(image_url).await
    }

    async fn find_post_page(&self, offset: u64, limit: u64) -> Result<Vec<PostWithOwner>, StoreError> {
        self.inner.find_post_page(offset, limit).await
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        self.inner.insert_post(post).await
    }

    async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        self.inner.save_post(post).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_post(id).await
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}

/// Services wired to an in-memory store with cheap hashing
pub struct TestContext {
    /// Shares its tables with `flaky`
    pub store: Arc<MemoryStore>,
    pub flaky: Arc<FlakyStore>,
    pub files: Arc<RecordingDisposer>,
    pub tokens: TokenService,
    pub accounts: AccountService,
    pub posts: PostService,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let flaky = Arc::new(FlakyStore::new(store.as_ref().clone()));
        let files = Arc::new(RecordingDisposer::default());
        let tokens = TokenService::new(TEST_SECRET, 3600).unwrap();
        let hasher = Arc::new(Argon2Hasher::new(&PasswordHashConfig::minimal()).unwrap());

        Self {
            accounts: AccountService::new(flaky.clone(), hasher, tokens.clone()),
            posts: PostService::new(flaky.clone(), files.clone(), 2),
            store,
            flaky,
            files,
            tokens,
        }
    }

    /// Register an account with [`TEST_PASSWORD`]
    pub async fn register(&self, email: &str, name: &str) -> Identity {
        self.accounts
            .register(RegisterInput {
                email: email.to_string(),
                name: name.to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await
            .unwrap()
    }

    pub fn ctx(identity: &Identity) -> AuthContext {
        AuthContext::authenticated(identity.id, identity.email.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_disposer_fails_once() {
        let files = RecordingDisposer::default();
        files.fail_next();
        assert!(files.dispose("a.png").await.is_err());
        assert!(files.dispose("b.png").await.is_ok());
        assert_eq!(files.disposed(), vec!["b.png".to_string()]);
    }

    #[tokio::test]
    async fn flaky_store_shares_tables_with_memory_store() {
        let t = TestContext::new();
        let ann = t.register("a@x.com", "Ann").await;
        assert!(t.store.find_identity(ann.id).await.unwrap().is_some());

        t.flaky.hide_identities();
        assert!(t.flaky.find_identity(ann.id).await.unwrap().is_none());
        assert!(t.store.find_identity(ann.id).await.unwrap().is_some());
    }
}
