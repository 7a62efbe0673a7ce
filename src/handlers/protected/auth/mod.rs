// handlers/protected/auth/mod.rs - The caller's own account

pub mod session;

pub use session::{status_get, status_put, whoami_get};
