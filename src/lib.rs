pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;

pub use routes::app;
pub use state::{AppState, StartupError};

#[cfg(test)]
pub mod testing;
