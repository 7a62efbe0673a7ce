// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and account creation. Route prefix: /auth/*

pub mod auth;

pub use auth::*;
