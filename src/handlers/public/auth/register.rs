// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::IdentityView;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::RegisterInput;
use crate::state::AppState;

/// POST /auth/register - Create an account
///
/// Input: `{"email": "...", "name": "...", "password": "..."}`
///
/// Responds 201 with the new identity (never the password hash), 409 when
/// the email is taken and 422 with every field defect otherwise.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> ApiResult<IdentityView> {
    let input = json_body(payload)?;
    let identity = state.accounts.register(input).await?;
    Ok(ApiResponse::created(IdentityView::from(&identity)))
}
