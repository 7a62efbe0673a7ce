use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::PostView;
use crate::auth::{require_authenticated, AuthContext};
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::pagination::Paginated;
use crate::services::CreatePostInput;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based; absent, non-numeric or below 1 means the first page
    pub page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> Option<i64> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

/// GET /api/posts?page=N - One page of the feed, newest first
///
/// Output: `{"items": [post...], "totalItems": N}`
pub async fn posts_get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<PageQuery>,
) -> ApiResult<Paginated<PostView>> {
    let page = state.posts.list_posts(&ctx, query.number()).await?;
    Ok(ApiResponse::success(page.map(PostView::from)))
}

/// POST /api/posts - Create a post owned by the caller
///
/// Input: `{"title": "...", "content": "...", "imageUrl": "..."}`
pub async fn posts_post(
    State(state): State<AppState>,
    ctx: AuthContext,
    payload: Result<Json<CreatePostInput>, JsonRejection>,
) -> ApiResult<PostView> {
    require_authenticated(&ctx)?;
    let input = json_body(payload)?;
    let created = state.posts.create_post(&ctx, input).await?;
    Ok(ApiResponse::created(PostView::from(created)))
}
