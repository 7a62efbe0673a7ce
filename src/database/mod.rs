pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use thiserror::Error;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use models::{Identity, Owner, Post, PostWithOwner};
pub use postgres::PgStore;
pub use repository::{IdentityRepository, PostRepository, Store};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
