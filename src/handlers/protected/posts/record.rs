use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::api::{DeleteResult, PostView};
use crate::auth::{require_authenticated, AuthContext};
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UpdatePostInput;
use crate::state::AppState;

/// GET /api/posts/:id
pub async fn post_get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<PostView> {
    let post = state.posts.get_post(&ctx, &id).await?;
    Ok(ApiResponse::success(PostView::from(post)))
}

/// PUT /api/posts/:id - Owner-only update
///
/// Input: `{"title": "...", "content": "...", "imageUrl": "..."}`. A missing
/// or blank `imageUrl` keeps the current image.
pub async fn post_put(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostInput>, JsonRejection>,
) -> ApiResult<PostView> {
    require_authenticated(&ctx)?;
    let input = json_body(payload)?;
    let updated = state.posts.update_post(&ctx, &id, input).await?;
    Ok(ApiResponse::success(PostView::from(updated)))
}

/// DELETE /api/posts/:id - Owner-only delete
pub async fn post_delete(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<DeleteResult> {
    state.posts.delete_post(&ctx, &id).await?;
    Ok(ApiResponse::success(DeleteResult { deleted: true }))
}
