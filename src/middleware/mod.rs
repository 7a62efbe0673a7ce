pub mod auth;
pub mod response;

pub use auth::{auth_context_middleware, resolve_auth_context};
pub use response::{ApiResponse, ApiResult};
