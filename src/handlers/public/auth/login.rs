// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::AuthData;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginInput;
use crate::state::AppState;

/// POST /auth/login - Exchange email and password for a bearer token
///
/// Input: `{"email": "...", "password": "..."}`
///
/// Output: `{"success": true, "data": {"id": "<uuid>", "token": "<jwt>"}}`
///
/// 404 when no account has the email, 401 when the password is wrong.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> ApiResult<AuthData> {
    let input = json_body(payload)?;
    let auth = state.accounts.login(input).await?;
    Ok(ApiResponse::success(auth))
}
