//! Authentication and authorization primitives.
//!
//! Tokens are stateless: validity depends only on the signature and the
//! embedded expiry. The per-request [`AuthContext`] is derived from the
//! presented token by the auth middleware, and protected operations consult
//! [`require_authenticated`] and [`require_owner`] explicitly.

pub mod context;
pub mod guard;
pub mod password;
pub mod token;

pub use context::AuthContext;
pub use guard::{require_authenticated, require_owner};
pub use password::{Argon2Hasher, CredentialHasher, HashError};
pub use token::{Claims, TokenError, TokenService};
