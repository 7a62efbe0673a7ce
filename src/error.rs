// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::database::StoreError;

/// One entry of an aggregated validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 401 Unauthorized
    #[error("{0}")]
    Unauthenticated(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict
    #[error("{0}")]
    Conflict(String),

    // 422 Unprocessable Entity, always carries every defect found
    #[error("{message}")]
    ValidationFailed {
        message: String,
        errors: Vec<FieldError>,
    },

    // 500, a valid auth context pointing at a missing identity
    #[error("{0}")]
    Inconsistent(String),

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),

    // 503 Service Unavailable
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthenticated(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::ValidationFailed { .. } => 422,
            ApiError::Inconsistent(_) => 500,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Field-level messages of a validation failure, empty for every other kind
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::ValidationFailed { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Convert to the `{message, data, status}` body every error response uses
    pub fn to_json(&self) -> Value {
        let data = match self {
            ApiError::ValidationFailed { errors, .. } => json!(errors),
            _ => Value::Null,
        };

        json!({
            "message": self.to_string(),
            "data": data,
            "status": self.status_code(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn validation_failed(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ApiError::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        ApiError::Inconsistent(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::ServiceUnavailable("Database temporarily unavailable".to_string())
            }
            StoreError::Query(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Store query error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
            StoreError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("Database error occurred")
            }
        }
    }
}

impl From<crate::auth::HashError> for ApiError {
    fn from(err: crate::auth::HashError) -> Self {
        tracing::error!("Credential hashing failed: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        tracing::error!("Token issuance failed: {}", err);
        ApiError::internal("An error occurred while processing your request")
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_every_entry() {
        let err = ApiError::validation_failed(
            "Invalid Input.",
            vec![
                FieldError::new("title", "Title is invalid."),
                FieldError::new("content", "Content is invalid."),
            ],
        );
        let body = err.to_json();
        assert_eq!(body["status"], 422);
        assert_eq!(body["message"], "Invalid Input.");
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["data"][1]["field"], "content");
    }

    #[test]
    fn non_validation_errors_have_null_data() {
        let body = ApiError::forbidden("Not authorized!").to_json();
        assert_eq!(body["status"], 403);
        assert!(body["data"].is_null());
    }

    #[test]
    fn statuses_match_kinds() {
        assert_eq!(ApiError::unauthenticated("x").status_code(), 401);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::inconsistent("x").status_code(), 500);
    }

    #[test]
    fn store_conflict_maps_to_409() {
        let err: ApiError = StoreError::Conflict("email taken".to_string()).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn store_query_error_hides_detail() {
        let err: ApiError = StoreError::Query("syntax error near SELECT".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.to_string().contains("SELECT"));
    }
}
