use crate::dto::todo::{TodoRequest, TodoResponse};
use crate::dto::ReadyQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

/// POST /blocks/{block_id}/todos
pub async fn create_todo(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let Path(block_id) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_todo_service(move |service| service.save_todo(block_id, &draft))
        .await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// GET /blocks/{block_id}/todos and GET /todos/byBlockId/{block_id}
/// Empty list for a block without todos.
pub async fn list_todos_by_block(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let Path(block_id) = path?;
    let todos = state
        .with_todo_service(move |service| service.find_todos_by_block_id(block_id))
        .await?;
    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// GET /todos
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<TodoResponse>>, ApiError> {
    let todos = state
        .with_todo_service(|service| service.find_all_todos())
        .await?;
    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// GET /blocks/{block_id}/todos/{todo_id}
pub async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Path((block_id, todo_id)) = path?;
    let todo = state
        .with_todo_service(move |service| service.find_todo_by_id(block_id, todo_id))
        .await?;
    Ok(Json(todo.into()))
}

/// PUT /blocks/{block_id}/todos/{todo_id}
pub async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Path((block_id, todo_id)) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_todo_service(move |service| service.update_todo(block_id, todo_id, &draft))
        .await?;
    Ok(Json(todo.into()))
}

/// DELETE /blocks/{block_id}/todos/{todo_id}
pub async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((block_id, todo_id)) = path?;
    state
        .with_todo_service(move |service| service.delete_todo(block_id, todo_id))
        .await?;
    Ok(StatusCode::OK)
}

/// PUT /blocks/{block_id}/todos/{todo_id}/ready?ready=
pub async fn update_todo_ready(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    query: Result<Query<ReadyQuery>, QueryRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Path((block_id, todo_id)) = path?;
    let Query(query) = query?;
    let ready = query.is_ready();
    let todo = state
        .with_todo_service(move |service| service.update_todo_is_ready(block_id, todo_id, ready))
        .await?;
    Ok(Json(todo.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/byBlockId/{block_id}", get(list_todos_by_block))
        .route(
            "/blocks/{block_id}/todos",
            get(list_todos_by_block).post(create_todo),
        )
        .route(
            "/blocks/{block_id}/todos/{todo_id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/blocks/{block_id}/todos/{todo_id}/ready", put(update_todo_ready))
}
