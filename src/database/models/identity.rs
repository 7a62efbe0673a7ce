use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status text every new account starts with
pub const DEFAULT_STATUS: &str = "I am new!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: Uuid,
    /// Normalized; unique across all identities
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub status: String,
    /// Ids of owned posts in creation order
    pub post_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: name.into(),
            status: DEFAULT_STATUS.to_string(),
            post_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_post(&mut self, post_id: Uuid) {
        self.post_ids.push(post_id);
        self.updated_at = Utc::now();
    }

    /// Returns whether the id was present
    pub fn remove_post(&mut self, post_id: Uuid) -> bool {
        let before = self.post_ids.len();
        self.post_ids.retain(|id| *id != post_id);
        self.updated_at = Utc::now();
        self.post_ids.len() != before
    }
}
