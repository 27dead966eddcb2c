//! Shared application state and the blocking bridge into core services.
//!
//! # Invariants
//! - The SQLite connection is only touched on blocking worker threads.
//! - One request holds the connection at a time.
//! - Experience awards never run while the connection is held.

use crate::error::ApiError;
use knighttodo_core::{
    request_award, DayService, ExperienceClient, RoutineInstanceService, RoutineService,
    RoutineTodoInstanceId, ServiceError, ServiceResult, SqliteDayRepository,
    SqliteRoutineRepository, SqliteTodoRepository, TodoService,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Experience client shared across request workers.
pub type SharedExperienceClient = Arc<dyn ExperienceClient + Send + Sync>;

pub type RoutineInstanceServiceImpl<'conn> =
    RoutineInstanceService<SqliteRoutineRepository<'conn>, SharedExperienceClient>;

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    experience: SharedExperienceClient,
}

impl AppState {
    pub fn new(conn: Connection, experience: SharedExperienceClient) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            experience,
        }
    }

    pub async fn with_day_service<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&DayService<SqliteDayRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        self.run_blocking(move |conn, _| {
            let repo = SqliteDayRepository::try_new(conn).map_err(ServiceError::from)?;
            f(&DayService::new(repo))
        })
        .await
    }

    pub async fn with_todo_service<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        self.run_blocking(move |conn, _| {
            let repo = SqliteTodoRepository::try_new(conn).map_err(ServiceError::from)?;
            f(&TodoService::new(repo))
        })
        .await
    }

    pub async fn with_routine_service<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&RoutineService<SqliteRoutineRepository<'_>>) -> ServiceResult<T>
            + Send
            + 'static,
    {
        self.run_blocking(move |conn, _| {
            let repo = SqliteRoutineRepository::try_new(conn).map_err(ServiceError::from)?;
            f(&RoutineService::new(repo))
        })
        .await
    }

    pub async fn with_routine_instance_service<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&RoutineInstanceServiceImpl<'_>) -> ServiceResult<T> + Send + 'static,
    {
        self.run_blocking(move |conn, experience| {
            let repo = SqliteRoutineRepository::try_new(conn).map_err(ServiceError::from)?;
            f(&RoutineInstanceService::new(repo, experience))
        })
        .await
    }

    /// Requests an experience award on a blocking worker, leaving the
    /// connection free for other requests.
    pub async fn request_award(&self, id: RoutineTodoInstanceId) -> Result<u32, ApiError> {
        let experience = Arc::clone(&self.experience);
        tokio::task::spawn_blocking(move || request_award(&*experience, id).map_err(ApiError::from))
            .await
            .map_err(join_failed)?
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, SharedExperienceClient) -> ServiceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let experience = Arc::clone(&self.experience);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))?;
            f(&guard, experience).map_err(ApiError::from)
        })
        .await
        .map_err(join_failed)?
    }
}

fn join_failed(err: tokio::task::JoinError) -> ApiError {
    ApiError::Internal(format!("blocking task failed: {err}"))
}
