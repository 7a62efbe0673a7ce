use std::sync::Arc;

use thiserror::Error;

use crate::auth::{Argon2Hasher, HashError, TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{AccountService, PostService};
use crate::storage::FileDisposer;

/// Failures while wiring the application together
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("token service: {0}")]
    Token(#[from] TokenError),

    #[error("password hasher: {0}")]
    Hash(#[from] HashError),
}

/// Shared handles every handler can reach
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub store: Arc<dyn Store>,
    pub accounts: Arc<AccountService>,
    pub posts: Arc<PostService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        files: Arc<dyn FileDisposer>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let tokens = TokenService::new(&config.security.jwt_secret, config.security.token_ttl_secs)?;
        let hasher = Arc::new(Argon2Hasher::new(&config.security.password_hash)?);

        let accounts = AccountService::new(store.clone(), hasher, tokens.clone());
        let posts = PostService::new(store.clone(), files, config.api.posts_per_page);

        Ok(Self {
            config: Arc::new(config),
            tokens,
            store,
            accounts: Arc::new(accounts),
            posts: Arc::new(posts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::testing::RecordingDisposer;

    #[test]
    fn empty_secret_refuses_to_start() {
        let config = AppConfig::development("");
        let result = AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingDisposer::default()),
        );
        assert!(matches!(result, Err(StartupError::Config(_))));
    }
}
