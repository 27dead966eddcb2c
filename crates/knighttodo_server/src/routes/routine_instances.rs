use crate::dto::routine::{
    RoutineInstanceRequest, RoutineInstanceResponse, RoutineTodoInstanceResponse,
};
use crate::dto::ReadyQuery;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use knighttodo_core::ReadyTransition;
use uuid::Uuid;

/// POST /api/v1/routines/{routine_id}/instances
/// Instantiates one todo instance per current template.
pub async fn create_instance(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RoutineInstanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoutineInstanceResponse>), ApiError> {
    let Path(routine_id) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let instance = state
        .with_routine_instance_service(move |service| service.save(routine_id, &draft))
        .await?;
    Ok((StatusCode::CREATED, Json(instance.into())))
}

/// GET /api/v1/routines/{routine_id}/instances
pub async fn list_instances(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<RoutineInstanceResponse>>, ApiError> {
    let Path(routine_id) = path?;
    let instances = state
        .with_routine_instance_service(move |service| service.find_by_routine_id(routine_id))
        .await?;
    Ok(Json(instances.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/routines/{routine_id}/instances/{instance_id}
pub async fn get_instance(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<RoutineInstanceResponse>, ApiError> {
    let Path((routine_id, instance_id)) = path?;
    let instance = state
        .with_routine_instance_service(move |service| service.find_by_id(routine_id, instance_id))
        .await?;
    Ok(Json(instance.into()))
}

/// PUT /api/v1/routines/{routine_id}/instances/{instance_id}
pub async fn update_instance(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<RoutineInstanceRequest>, JsonRejection>,
) -> Result<Json<RoutineInstanceResponse>, ApiError> {
    let Path((routine_id, instance_id)) = path?;
    let Json(request) = payload?;
    let draft = request.into_draft()?;
    let instance = state
        .with_routine_instance_service(move |service| {
            service.update(routine_id, instance_id, &draft)
        })
        .await?;
    Ok(Json(instance.into()))
}

/// DELETE /api/v1/routines/{routine_id}/instances/{instance_id}
pub async fn delete_instance(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((routine_id, instance_id)) = path?;
    state
        .with_routine_instance_service(move |service| {
            service.delete_by_id(routine_id, instance_id)
        })
        .await?;
    Ok(StatusCode::OK)
}

/// GET /api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances
pub async fn list_todo_instances(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<Vec<RoutineTodoInstanceResponse>>, ApiError> {
    let Path((routine_id, instance_id)) = path?;
    let todo_instances = state
        .with_routine_instance_service(move |service| {
            service.find_todo_instances(routine_id, instance_id)
        })
        .await?;
    Ok(Json(todo_instances.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances/{todo_instance_id}
pub async fn get_todo_instance(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid, Uuid)>, PathRejection>,
) -> Result<Json<RoutineTodoInstanceResponse>, ApiError> {
    let Path((routine_id, instance_id, todo_instance_id)) = path?;
    let todo_instance = state
        .with_routine_instance_service(move |service| {
            service.find_todo_instance_by_id(routine_id, instance_id, todo_instance_id)
        })
        .await?;
    Ok(Json(todo_instance.into()))
}

/// PUT /api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances/{todo_instance_id}/ready?ready=
/// Entering ready requests an experience award; a failed award answers 502.
/// The award runs without holding the database.
pub async fn update_todo_instance_ready(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, Uuid, Uuid)>, PathRejection>,
    query: Result<Query<ReadyQuery>, QueryRejection>,
) -> Result<Json<RoutineTodoInstanceResponse>, ApiError> {
    let Path((routine_id, instance_id, todo_instance_id)) = path?;
    let Query(query) = query?;
    let ready = query.is_ready();
    let transition = state
        .with_routine_instance_service(move |service| {
            service.begin_ready_transition(routine_id, instance_id, todo_instance_id, ready)
        })
        .await?;
    let todo_instance = match transition {
        ReadyTransition::Settled(todo_instance) => todo_instance,
        ReadyTransition::AwardPending(id) => {
            let experience = state.request_award(id).await?;
            state
                .with_routine_instance_service(move |service| {
                    service.complete_ready_transition(routine_id, instance_id, id, experience)
                })
                .await?
        }
    };
    Ok(Json(todo_instance.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/routines/{routine_id}/instances",
            get(list_instances).post(create_instance),
        )
        .route(
            "/api/v1/routines/{routine_id}/instances/{instance_id}",
            get(get_instance).put(update_instance).delete(delete_instance),
        )
        .route(
            "/api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances",
            get(list_todo_instances),
        )
        .route(
            "/api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances/{todo_instance_id}",
            get(get_todo_instance),
        )
        .route(
            "/api/v1/routines/{routine_id}/instances/{instance_id}/todoInstances/{todo_instance_id}/ready",
            put(update_todo_instance_ready),
        )
}
