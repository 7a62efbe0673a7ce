use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::manager::DatabaseManager;
use super::models::post::PostOwnerRow;
use super::models::{Identity, Post, PostWithOwner};
use super::repository::{IdentityRepository, PostRepository, Store};
use super::StoreError;

const IDENTITY_COLUMNS: &str = "id, email, password_hash, name, status, post_ids, created_at, updated_at";

const POST_WITH_OWNER: &str = r#"
    SELECT p.id, p.title, p.content, p.image_url, p.owner_id,
           COALESCE(i.name, '') AS owner_name,
           p.created_at, p.updated_at
    FROM posts p
    LEFT JOIN identities i ON i.id = p.owner_id
"#;

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, message: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(message),
        _ => StoreError::Sqlx(err),
    }
}

fn expect_identity_row(rows_affected: u64, identity_id: Uuid) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::Query(format!("identity {} does not exist", identity_id)));
    }
    Ok(())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl IdentityRepository for PgStore {
    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn insert_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO identities ({IDENTITY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.name)
        .bind(&identity.status)
        .bind(&identity.post_ids)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Email '{}' is already registered", identity.email)))?;

        Ok(())
    }

    async fn append_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE identities SET post_ids = array_append(post_ids, $2), updated_at = now() WHERE id = $1",
        )
        .bind(identity_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        expect_identity_row(result.rows_affected(), identity_id)
    }

    async fn remove_post_id(&self, identity_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE identities SET post_ids = array_remove(post_ids, $2), updated_at = now() WHERE id = $1",
        )
        .bind(identity_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        expect_identity_row(result.rows_affected(), identity_id)
    }

    async fn update_identity_status(&self, identity_id: Uuid, status: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE identities SET status = $2, updated_at = now() WHERE id = $1")
            .bind(identity_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        expect_identity_row(result.rows_affected(), identity_id)
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, image_url, owner_id, created_at, updated_at
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post_with_owner(&self, id: Uuid) -> Result<Option<PostWithOwner>, StoreError> {
        let row = sqlx::query_as::<_, PostOwnerRow>(&format!("{POST_WITH_OWNER} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PostWithOwner::from))
    }

    async fn count_posts(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn count_posts_with_image(&self, image_url: &str) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE image_url = $1")
            .bind(image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_post_page(&self, offset: u64, limit: u64) -> Result<Vec<PostWithOwner>, StoreError> {
        let rows = sqlx::query_as::<_, PostOwnerRow>(&format!(
            "{POST_WITH_OWNER} ORDER BY p.created_at DESC, p.id ASC OFFSET $1 LIMIT $2"
        ))
        .bind(to_i64(offset))
        .bind(to_i64(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostWithOwner::from).collect())
    }

    async fn insert_post(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, title, content, image_url, owner_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.owner_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_post(&self, post: &Post) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, image_url = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Query(format!("post {} does not exist", post.id)));
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
