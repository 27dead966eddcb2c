//! Core domain logic for KnightTodo.
//! This crate is the single source of truth for aggregate invariants.

pub mod db;
pub mod experience;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use experience::{
    ExperienceClient, ExperienceError, ExperienceRequest, HttpExperienceClient, RetryPolicy,
};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::common::{EntityKind, Hardness, Scariness, TodoDraft};
pub use model::day::{Day, DayId, DayTodo, DayTodoId};
pub use model::routine::{
    Routine, RoutineId, RoutineInstance, RoutineInstanceDraft, RoutineInstanceId, RoutineTodo,
    RoutineTodoId, RoutineTodoInstance, RoutineTodoInstanceId, RoutineTodoProjection,
};
pub use model::todo::{Todo, TodoBlock, TodoBlockId, TodoId};
pub use repo::day_repo::{DayRepository, SqliteDayRepository};
pub use repo::routine_repo::{RoutineDeletion, RoutineRepository, SqliteRoutineRepository};
pub use repo::todo_repo::{SqliteTodoRepository, TodoRepository};
pub use repo::{RepoError, RepoResult};
pub use service::day_service::DayService;
pub use service::routine_instance_service::{request_award, ReadyTransition, RoutineInstanceService};
pub use service::routine_service::RoutineService;
pub use service::todo_service::TodoService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
