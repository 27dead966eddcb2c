use crate::dto::todo::{TodoBlockRequest, TodoBlockResponse};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

/// POST /blocks/block
pub async fn create_block(
    State(state): State<AppState>,
    payload: Result<Json<TodoBlockRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoBlockResponse>), ApiError> {
    let Json(request) = payload?;
    let name = request.into_name()?;
    let block = state
        .with_todo_service(move |service| service.save_block(&name))
        .await?;
    Ok((StatusCode::CREATED, Json(block.into())))
}

/// GET /blocks/block
pub async fn list_blocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoBlockResponse>>, ApiError> {
    let blocks = state
        .with_todo_service(|service| service.find_all_blocks())
        .await?;
    Ok(Json(blocks.into_iter().map(Into::into).collect()))
}

/// GET /blocks/block/{block_id}
pub async fn get_block(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TodoBlockResponse>, ApiError> {
    let Path(block_id) = path?;
    let block = state
        .with_todo_service(move |service| service.find_block_by_id(block_id))
        .await?;
    Ok(Json(block.into()))
}

/// PUT /blocks/block/{block_id}
pub async fn update_block(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TodoBlockRequest>, JsonRejection>,
) -> Result<Json<TodoBlockResponse>, ApiError> {
    let Path(block_id) = path?;
    let Json(request) = payload?;
    let name = request.into_name()?;
    let block = state
        .with_todo_service(move |service| service.update_block(block_id, &name))
        .await?;
    Ok(Json(block.into()))
}

/// DELETE /blocks/block/{block_id}
/// Always removes the block's todos with it.
pub async fn delete_block(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(block_id) = path?;
    state
        .with_todo_service(move |service| service.delete_block(block_id))
        .await?;
    Ok(StatusCode::OK)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/blocks/block", get(list_blocks).post(create_block))
        .route(
            "/blocks/block/{block_id}",
            get(get_block).put(update_block).delete(delete_block),
        )
}
