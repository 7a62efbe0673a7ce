use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::api::AuthData;
use crate::auth::{require_authenticated, AuthContext, CredentialHasher, TokenService};
use crate::database::{Identity, IdentityRepository, Store};
use crate::error::ApiError;
use crate::validation::{has_min_length, is_email, normalize_email, Validator};

pub const MIN_PASSWORD_LENGTH: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Registration, login and the caller's own account
pub struct AccountService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>, tokens: TokenService) -> Self {
        Self { store, hasher, tokens }
    }

    /// Create an account. A taken email is a 409 reported before any other field
    /// is looked at; every other defect is collected into a single 422.
    pub async fn register(&self, input: RegisterInput) -> Result<Identity, ApiError> {
        let email = input.email.trim();
        let name = input.name.trim();
        let password = input.password.trim();

        let mut validator = Validator::new();
        let email_valid = is_email(email);
        validator.check(email_valid, "email", "E-Mail is invalid.");
        let email = normalize_email(email);

        if email_valid && self.store.find_identity_by_email(&email).await?.is_some() {
            warn!("Registration rejected: {} is already registered", email);
            return Err(ApiError::conflict("This user already exists"));
        }

        validator
            .check(!name.is_empty(), "name", "Please enter a name.")
            .check(
                has_min_length(password, MIN_PASSWORD_LENGTH),
                "password",
                "Please enter a valid password.",
            );
        validator.finish()?;

        let password_hash = self.hasher.hash(password)?;
        let identity = Identity::new(email, password_hash, name);
        // A concurrent registration of the same email surfaces here as a 409
        self.store.insert_identity(&identity).await?;

        info!("Registered identity {} ({})", identity.id, identity.email);
        Ok(identity)
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthData, ApiError> {
        let email = normalize_email(&input.email);

        let identity = self
            .store
            .find_identity_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::not_found("User is not found"))?;

        if !self.hasher.verify(&input.password, &identity.password_hash)? {
            warn!("Login failed for {}: wrong password", identity.email);
            return Err(ApiError::unauthenticated("Password is incorrect"));
        }

        let token = self.tokens.issue(identity.id, &identity.email)?;
        info!("Issued token for {} ({}s)", identity.id, self.tokens.ttl().num_seconds());

        Ok(AuthData {
            id: identity.id,
            token,
        })
    }

    /// The caller's own identity
    pub async fn whoami(&self, ctx: &AuthContext) -> Result<Identity, ApiError> {
        let user_id = require_authenticated(ctx)?;
        self.store
            .find_identity(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found."))
    }

    pub async fn status(&self, ctx: &AuthContext) -> Result<String, ApiError> {
        Ok(self.whoami(ctx).await?.status)
    }

    pub async fn update_status(&self, ctx: &AuthContext, status: &str) -> Result<String, ApiError> {
        let identity = self.whoami(ctx).await?;

        let status = status.trim();
        let mut validator = Validator::new();
        validator.check(!status.is_empty(), "status", "Status must not be empty.");
        validator.finish()?;

        self.store.update_identity_status(identity.id, status).await?;
        Ok(status.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestContext, TEST_PASSWORD};
    use uuid::Uuid;

    fn input(email: &str, name: &str, password: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_stores_a_hash_not_the_password() {
        let t = TestContext::new();
        let identity = t.accounts.register(input(" A@X.com ", " Ann ", "secret1")).await.unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.name, "Ann");
        assert!(identity.post_ids.is_empty());

        let stored = t.store.find_identity(identity.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
    }

    #[tokio::test]
    async fn register_collects_every_defect() {
        let t = TestContext::new();
        let err = t.accounts.register(input("not-an-email", "   ", "abc")).await.unwrap_err();

        assert_eq!(err.status_code(), 422);
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name", "password"]);
    }

    #[tokio::test]
    async fn duplicate_email_wins_over_other_defects() {
        let t = TestContext::new();
        t.register("a@x.com", "Ann").await;

        // Bad name and password would be 422, but the taken address is reported first
        let err = t.accounts.register(input("A@x.com", "", "no")).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(err.field_errors().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_creates_nothing() {
        let t = TestContext::new();
        let first = t.register("a@x.com", "Ann").await;
        let _ = t.accounts.register(input("a@x.com", "Other", "secret2")).await;

        let stored = t.store.find_identity_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.name, "Ann");
    }

    #[tokio::test]
    async fn login_issues_a_token_for_the_identity() {
        let t = TestContext::new();
        let ann = t.register("a@x.com", "Ann").await;

        let auth = t
            .accounts
            .login(LoginInput {
                email: "A@X.COM".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(auth.id, ann.id);
        let claims = t.tokens.verify(&auth.token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.user_id(), Some(ann.id));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let t = TestContext::new();
        t.register("a@x.com", "Ann").await;

        let err = t
            .accounts
            .login(LoginInput {
                email: "a@x.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn login_for_unknown_email_is_404() {
        let t = TestContext::new();
        let err = t
            .accounts
            .login(LoginInput {
                email: "ghost@x.com".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn status_can_be_read_and_updated_by_the_caller() {
        let t = TestContext::new();
        let ann = t.register("a@x.com", "Ann").await;
        let ctx = TestContext::ctx(&ann);

        assert_eq!(t.accounts.status(&ctx).await.unwrap(), "I am new!");
        assert_eq!(t.accounts.update_status(&ctx, "  busy  ").await.unwrap(), "busy");
        assert_eq!(t.accounts.status(&ctx).await.unwrap(), "busy");
        assert_eq!(t.store.find_identity(ann.id).await.unwrap().unwrap().name, "Ann");

        let err = t.accounts.update_status(&ctx, "   ").await.unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn whoami_requires_a_known_caller() {
        let t = TestContext::new();
        let err = t.accounts.whoami(&AuthContext::anonymous()).await.unwrap_err();
        assert_eq!(err.status_code(), 401);

        let ghost = AuthContext::authenticated(Uuid::new_v4(), "ghost@x.com");
        let err = t.accounts.whoami(&ghost).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
