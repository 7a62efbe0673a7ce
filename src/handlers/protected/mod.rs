// handlers/protected/mod.rs - Handlers under /api/*
//
// Every request here carries an AuthContext resolved by the auth middleware.
// The services reject anonymous callers, so these handlers never inspect
// the token themselves.

pub mod auth;
pub mod posts;

pub use auth::*;
pub use posts::*;
