// handlers/mod.rs - HTTP handlers split by security tier
//
// Public (no token needed) and protected (/api/*, token checked by the
// operation itself). Handlers stay thin: extract, call a service, wrap the
// result in the success envelope.

pub mod public;
pub mod protected;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use tracing::debug;

use crate::error::ApiError;
use crate::validation::INVALID_INPUT;

/// Unwrap a JSON body, turning an unreadable payload into a 422 in the usual error shape
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            Err(ApiError::validation_failed(INVALID_INPUT, Vec::new()))
        }
    }
}
