use uuid::Uuid;

use super::AuthContext;
use crate::error::ApiError;

/// Fails with 401 unless the request carried a valid token. Returns the caller's id.
pub fn require_authenticated(ctx: &AuthContext) -> Result<Uuid, ApiError> {
    ctx.user_id()
        .ok_or_else(|| ApiError::unauthenticated("Not authenticated!"))
}

/// Fails with 403 unless the caller owns the resource.
///
/// Ids are compared as parsed values, so differently formatted spellings of
/// the same id (case, braces, simple form) are treated as equal.
pub fn require_owner(ctx: &AuthContext, owner_id: Uuid) -> Result<(), ApiError> {
    let caller = require_authenticated(ctx)?;
    if caller != owner_id {
        tracing::warn!(
            "Ownership check failed: caller {} ({}) is not owner {}",
            caller,
            ctx.email().unwrap_or("unknown"),
            owner_id
        );
        return Err(ApiError::forbidden("Not authorized!"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_is_unauthenticated() {
        let err = require_authenticated(&AuthContext::anonymous()).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn authenticated_returns_caller() {
        let id = Uuid::new_v4();
        let ctx = AuthContext::authenticated(id, "a@x.com");
        assert_eq!(require_authenticated(&ctx).unwrap(), id);
    }

    #[test]
    fn owner_passes() {
        let id = Uuid::new_v4();
        assert!(require_owner(&AuthContext::authenticated(id, "a@x.com"), id).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let ctx = AuthContext::authenticated(Uuid::new_v4(), "b@x.com");
        let err = require_owner(&ctx, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn ids_compare_by_value_not_spelling() {
        let id = Uuid::new_v4();
        let upper = Uuid::parse_str(&id.to_string().to_uppercase()).unwrap();
        let simple = Uuid::parse_str(&id.simple().to_string()).unwrap();
        let ctx = AuthContext::authenticated(upper, "a@x.com");
        assert!(require_owner(&ctx, simple).is_ok());
    }
}
