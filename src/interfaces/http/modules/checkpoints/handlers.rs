//! Checkpoint administration handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CheckpointDto, CheckpointListResponse, CreateCheckpointRequest, UpdateCheckpointRequest,
};
use crate::application::CheckpointService;
use crate::interfaces::http::common::{ApiResult, ErrorResponse, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

#[derive(Clone)]
pub struct CheckpointHandlerState {
    pub checkpoints: Arc<CheckpointService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/checkpoints",
    tag = "Checkpoints",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All checkpoints", body = CheckpointListResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
pub async fn list_checkpoints(
    State(state): State<CheckpointHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Json<CheckpointListResponse>> {
    let checkpoints: Vec<CheckpointDto> = state
        .checkpoints
        .list(&actor)
        .await?
        .into_iter()
        .map(CheckpointDto::from)
        .collect();

    Ok(Json(CheckpointListResponse {
        count: checkpoints.len(),
        checkpoints,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/checkpoints",
    tag = "Checkpoints",
    security(("bearer_auth" = [])),
    request_body = CreateCheckpointRequest,
    responses(
        (status = 201, description = "Checkpoint created", body = CheckpointDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Checkpoint already exists", body = ErrorResponse)
    )
)]
pub async fn create_checkpoint(
    State(state): State<CheckpointHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<CreateCheckpointRequest>,
) -> ApiResult<(StatusCode, Json<CheckpointDto>)> {
    let checkpoint = state.checkpoints.create(&actor, request.into()).await?;
    Ok((StatusCode::CREATED, Json(CheckpointDto::from(checkpoint))))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/checkpoints/{checkpoint_id}",
    tag = "Checkpoints",
    security(("bearer_auth" = [])),
    params(("checkpoint_id" = String, Path, description = "Checkpoint ID")),
    request_body = UpdateCheckpointRequest,
    responses(
        (status = 200, description = "Checkpoint updated", body = CheckpointDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Checkpoint not found", body = ErrorResponse)
    )
)]
pub async fn update_checkpoint(
    State(state): State<CheckpointHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(checkpoint_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateCheckpointRequest>,
) -> ApiResult<Json<CheckpointDto>> {
    let checkpoint = state
        .checkpoints
        .update(&actor, &checkpoint_id, request.into())
        .await?;
    Ok(Json(CheckpointDto::from(checkpoint)))
}
