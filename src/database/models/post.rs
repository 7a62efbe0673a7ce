use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Reference to the stored image, relative to the image root
    pub image_url: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        owner_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            image_url: image_url.into(),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The owner fields resolved alongside a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostWithOwner {
    pub post: Post,
    pub owner: Owner,
}

/// Flat row shape of `posts LEFT JOIN identities`
#[derive(Debug, FromRow)]
pub(crate) struct PostOwnerRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostOwnerRow> for PostWithOwner {
    fn from(row: PostOwnerRow) -> Self {
        Self {
            owner: Owner {
                id: row.owner_id,
                name: row.owner_name,
            },
            post: Post {
                id: row.id,
                title: row.title,
                content: row.content,
                image_url: row.image_url,
                owner_id: row.owner_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}
