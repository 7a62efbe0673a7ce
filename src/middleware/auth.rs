use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{AuthContext, TokenService};

/// Resolves the caller's [`AuthContext`] and attaches it to the request.
///
/// Never rejects on its own. A missing, malformed or expired token yields an
/// anonymous context and each operation decides whether that is acceptable.
pub async fn auth_context_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = resolve_auth_context(request.headers(), &tokens);
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Derive the auth context from an `Authorization: Bearer <token>` header
pub fn resolve_auth_context(headers: &HeaderMap, tokens: &TokenService) -> AuthContext {
    let Some(token) = extract_bearer(headers) else {
        return AuthContext::anonymous();
    };

    let claims = match tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected bearer token: {}", e);
            return AuthContext::anonymous();
        }
    };

    match claims.user_id() {
        Some(user_id) => AuthContext::authenticated(user_id, claims.email),
        None => {
            debug!("Token subject '{}' is not a user id", claims.sub);
            AuthContext::anonymous()
        }
    }
}

/// Token part of a two-part `Bearer <token>` header value
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split_whitespace();
    let (scheme, token) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<AuthContext>().cloned().unwrap_or_default())
    }
}
