use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::api::{IdentityView, StatusView};
use crate::auth::{require_authenticated, AuthContext};
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /api/auth/whoami - The authenticated caller's identity
pub async fn whoami_get(State(state): State<AppState>, ctx: AuthContext) -> ApiResult<IdentityView> {
    let identity = state.accounts.whoami(&ctx).await?;
    Ok(ApiResponse::success(IdentityView::from(&identity)))
}

/// GET /api/auth/status
pub async fn status_get(State(state): State<AppState>, ctx: AuthContext) -> ApiResult<StatusView> {
    let status = state.accounts.status(&ctx).await?;
    Ok(ApiResponse::success(StatusView { status }))
}

/// PUT /api/auth/status - Replace the caller's status text
///
/// Input: `{"status": "..."}`; blank after trimming is a 422.
pub async fn status_put(
    State(state): State<AppState>,
    ctx: AuthContext,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<StatusView> {
    require_authenticated(&ctx)?;
    let request = json_body(payload)?;
    let status = state.accounts.update_status(&ctx, &request.status).await?;
    Ok(ApiResponse::success(StatusView { status }))
}
