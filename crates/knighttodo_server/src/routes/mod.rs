//! REST surface.
//!
//! Handlers stay thin: decode and validate the wire shape, run one service
//! call on a blocking worker, map the result back to a response DTO.

pub mod days;
pub mod routine_instances;
pub mod routines;
pub mod todo_blocks;
pub mod todos;

use crate::state::AppState;
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(days::router())
        .merge(routines::router())
        .merge(routine_instances::router())
        .merge(todo_blocks::router())
        .merge(todos::router())
        .with_state(state)
}
