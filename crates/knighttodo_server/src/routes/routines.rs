use crate::dto::routine::{RoutineRequest, RoutineResponse, RoutineTodoRequest, RoutineTodoResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

/// POST /api/v1/routines
pub async fn create_routine(
    State(state): State<AppState>,
    payload: Result<Json<RoutineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoutineResponse>), ApiError> {
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let routine = state
        .with_routine_service(move |service| service.save(&draft))
        .await?;
    Ok((StatusCode::CREATED, Json(routine.into())))
}

/// GET /api/v1/routines
pub async fn list_routines(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoutineResponse>>, ApiError> {
    let routines = state
        .with_routine_service(|service| service.find_all())
        .await?;
    Ok(Json(routines.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/routines/{routine_id}
pub async fn get_routine(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RoutineResponse>, ApiError> {
    let Path(routine_id) = path?;
    let routine = state
        .with_routine_service(move |service| service.find_by_id(routine_id))
        .await?;
    Ok(Json(routine.into()))
}

/// PUT /api/v1/routines/{routine_id}
pub async fn update_routine(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RoutineRequest>, JsonRejection>,
) -> Result<Json<RoutineResponse>, ApiError> {
    let Path(routine_id) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let routine = state
        .with_routine_service(move |service| service.update_routine(routine_id, &draft))
        .await?;
    Ok(Json(routine.into()))
}

/// DELETE /api/v1/routines/{routine_id}
/// Removes templates, instances and their todo instances with the routine.
pub async fn delete_routine(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(routine_id) = path?;
    state
        .with_routine_service(move |service| service.delete_by_id(routine_id))
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/routines/{routine_id}/todos
pub async fn create_routine_todo(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RoutineTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoutineTodoResponse>), ApiError> {
    let Path(routine_id) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_routine_service(move |service| service.save_todo(routine_id, &draft))
        .await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// GET /api/v1/routines/{routine_id}/todos
pub async fn list_routine_todos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<RoutineTodoResponse>>, ApiError> {
    let Path(routine_id) = path?;
    let todos = state
        .with_routine_service(move |service| service.find_todos_by_routine_id(routine_id))
        .await?;
    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/routines/{routine_id}/todos/{routine_todo_id}
pub async fn get_routine_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<RoutineTodoResponse>, ApiError> {
    let Path((routine_id, todo_id)) = path?;
    let todo = state
        .with_routine_service(move |service| service.find_todo_by_id(routine_id, todo_id))
        .await?;
    Ok(Json(todo.into()))
}

/// PUT /api/v1/routines/{routine_id}/todos/{routine_todo_id}
pub async fn update_routine_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<RoutineTodoRequest>, JsonRejection>,
) -> Result<Json<RoutineTodoResponse>, ApiError> {
    let Path((routine_id, todo_id)) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_routine_service(move |service| service.update_todo(routine_id, todo_id, &draft))
        .await?;
    Ok(Json(todo.into()))
}

/// DELETE /api/v1/routines/{routine_id}/todos/{routine_todo_id}
pub async fn delete_routine_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((routine_id, todo_id)) = path?;
    state
        .with_routine_service(move |service| service.delete_todo(routine_id, todo_id))
        .await?;
    Ok(StatusCode::OK)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/routines", get(list_routines).post(create_routine))
        .route(
            "/api/v1/routines/{routine_id}",
            get(get_routine).put(update_routine).delete(delete_routine),
        )
        .route(
            "/api/v1/routines/{routine_id}/todos",
            get(list_routine_todos).post(create_routine_todo),
        )
        .route(
            "/api/v1/routines/{routine_id}/todos/{routine_todo_id}",
            get(get_routine_todo)
                .put(update_routine_todo)
                .delete(delete_routine_todo),
        )
}
