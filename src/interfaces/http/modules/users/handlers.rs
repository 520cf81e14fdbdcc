//! User management API handlers
//!
//! Admin-only endpoints. Role enforcement happens twice: the router's
//! scope layer and `UserService` itself.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{CreateUserRequest, UpdateUserRequest, UserDto, UserListResponse};
use crate::application::UserService;
use crate::interfaces::http::common::{ApiResult, ErrorResponse, MessageResponse, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub users: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Json<UserListResponse>> {
    let users: Vec<UserDto> = state
        .users
        .list_users(&actor)
        .await?
        .into_iter()
        .map(UserDto::from)
        .collect();

    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let user = state.users.create_user(&actor, request.into()).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserDto>> {
    let user = state
        .users
        .update_user(&actor, &user_id, request.into())
        .await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{user_id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete your own account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.users.delete_user(&actor, &user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
