use crate::dto::day::{DayRequest, DayResponse, DayTodoRequest, DayTodoResponse};
use crate::dto::ReadyQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

/// POST /api/v1/days
pub async fn create_day(
    State(state): State<AppState>,
    payload: Result<Json<DayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DayResponse>), ApiError> {
    let Json(request) = payload?;
    let name = request.into_name()?;
    let day = state.with_day_service(move |service| service.save(&name)).await?;
    Ok((StatusCode::CREATED, Json(day.into())))
}

/// GET /api/v1/days
pub async fn list_days(State(state): State<AppState>) -> Result<Json<Vec<DayResponse>>, ApiError> {
    let days = state.with_day_service(|service| service.find_all()).await?;
    Ok(Json(days.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/days/{day_id}
pub async fn get_day(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DayResponse>, ApiError> {
    let Path(day_id) = path?;
    let day = state
        .with_day_service(move |service| service.find_by_id(day_id))
        .await?;
    Ok(Json(day.into()))
}

/// PUT /api/v1/days/{day_id}
pub async fn update_day(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DayRequest>, JsonRejection>,
) -> Result<Json<DayResponse>, ApiError> {
    let Path(day_id) = path?;
    let Json(request) = payload?;
    let name = request.into_name()?;
    let day = state
        .with_day_service(move |service| service.update_day(day_id, &name))
        .await?;
    Ok(Json(day.into()))
}

/// DELETE /api/v1/days/{day_id}
/// Removes the day together with all of its todos.
pub async fn delete_day(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(day_id) = path?;
    state
        .with_day_service(move |service| service.delete_by_id(day_id))
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/days/{day_id}/todos
pub async fn create_day_todo(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DayTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DayTodoResponse>), ApiError> {
    let Path(day_id) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_day_service(move |service| service.save_todo(day_id, &draft))
        .await?;
    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// GET /api/v1/days/{day_id}/todos
pub async fn list_day_todos(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<DayTodoResponse>>, ApiError> {
    let Path(day_id) = path?;
    let todos = state
        .with_day_service(move |service| service.find_todos_by_day_id(day_id))
        .await?;
    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/days/{day_id}/todos/{day_todo_id}
pub async fn get_day_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<DayTodoResponse>, ApiError> {
    let Path((day_id, todo_id)) = path?;
    let todo = state
        .with_day_service(move |service| service.find_todo_by_id(day_id, todo_id))
        .await?;
    Ok(Json(todo.into()))
}

/// PUT /api/v1/days/{day_id}/todos/{day_todo_id}
pub async fn update_day_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<DayTodoRequest>, JsonRejection>,
) -> Result<Json<DayTodoResponse>, ApiError> {
    let Path((day_id, todo_id)) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let todo = state
        .with_day_service(move |service| service.update_todo(day_id, todo_id, &draft))
        .await?;
    Ok(Json(todo.into()))
}

/// DELETE /api/v1/days/{day_id}/todos/{day_todo_id}
pub async fn delete_day_todo(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((day_id, todo_id)) = path?;
    state
        .with_day_service(move |service| service.delete_todo(day_id, todo_id))
        .await?;
    Ok(StatusCode::OK)
}

/// PUT /api/v1/days/{day_id}/todos/{day_todo_id}/ready?ready=
pub async fn update_day_todo_ready(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    query: Result<Query<ReadyQuery>, QueryRejection>,
) -> Result<Json<DayTodoResponse>, ApiError> {
    let Path((day_id, todo_id)) = path?;
    let Query(query) = query?;
    let ready = query.is_ready();
    let todo = state
        .with_day_service(move |service| service.update_todo_is_ready(day_id, todo_id, ready))
        .await?;
    Ok(Json(todo.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/days", get(list_days).post(create_day))
        .route(
            "/api/v1/days/{day_id}",
            get(get_day).put(update_day).delete(delete_day),
        )
        .route(
            "/api/v1/days/{day_id}/todos",
            get(list_day_todos).post(create_day_todo),
        )
        .route(
            "/api/v1/days/{day_id}/todos/{day_todo_id}",
            get(get_day_todo).put(update_day_todo).delete(delete_day_todo),
        )
        .route(
            "/api/v1/days/{day_id}/todos/{day_todo_id}/ready",
            put(update_day_todo_ready),
        )
}
