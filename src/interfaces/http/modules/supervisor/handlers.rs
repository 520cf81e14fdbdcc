//! Supervisor review handlers: entry listing, CSV export, password reset

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};

use super::dto::{EntryFilterParams, ResetPasswordRequest};
use crate::application::{EntryService, UserService};
use crate::interfaces::http::common::{ApiResult, ErrorResponse, MessageResponse, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;
use crate::interfaces::http::modules::sync::EntryListResponse;

#[derive(Clone)]
pub struct SupervisorHandlerState {
    pub entries: Arc<EntryService>,
    pub users: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/supervisor/entries",
    tag = "Supervisor",
    security(("bearer_auth" = [])),
    params(EntryFilterParams),
    responses(
        (status = 200, description = "Entries visible to the caller", body = EntryListResponse),
        (status = 403, description = "Supervisor or admin access required", body = ErrorResponse)
    )
)]
pub async fn list_entries(
    State(state): State<SupervisorHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Query(params): Query<EntryFilterParams>,
) -> ApiResult<Json<EntryListResponse>> {
    let entries = state.entries.list(&actor, params.checkpoint_id).await?;
    Ok(Json(EntryListResponse::from(entries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/supervisor/export",
    tag = "Supervisor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 403, description = "Supervisor or admin access required", body = ErrorResponse)
    )
)]
pub async fn export_entries(
    State(state): State<SupervisorHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> ApiResult<Response> {
    let export = state.entries.export_csv(&actor).await?;
    let disposition = format!("attachment; filename=\"{}\"", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/v1/supervisor/reset-password",
    tag = "Supervisor",
    security(("bearer_auth" = [])),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Weak password", body = ErrorResponse),
        (status = 403, description = "Operator not managed by caller", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<SupervisorHandlerState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .users
        .reset_password(&actor, &request.user_id, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
