//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use super::dto::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};
use crate::application::UserService;
use crate::interfaces::http::common::{ApiResult, ErrorResponse, ValidatedJson};

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub users: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let result = state
        .users
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(LoginResponse::from(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Authentication",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let grant = state.users.refresh(&request.refresh_token).await?;
    Ok(Json(RefreshResponse::from(grant)))
}
