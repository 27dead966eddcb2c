//! HTTP surface of KnightTodo.
//!
//! # Responsibility
//! - Map REST requests onto the core aggregate services.
//! - Own process configuration and shared request state.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::{AppState, SharedExperienceClient};

use axum::Router;

/// Builds the full application router over `state`.
pub fn app(state: AppState) -> Router {
    routes::router(state)
}
