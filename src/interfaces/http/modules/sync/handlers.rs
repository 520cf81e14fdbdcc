//! Sync API handlers: batch push and delta pull

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};

use super::dto::{EntryListResponse, SyncPullParams, SyncPushRequest, SyncPushResponse};
use crate::application::SyncService;
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorResponse, ValidatedJson};
use crate::interfaces::http::middleware::CurrentUser;

/// Sync handler state
#[derive(Clone)]
pub struct SyncHandlerState {
    pub sync: Arc<SyncService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/sync/push",
    tag = "Sync",
    security(("bearer_auth" = [])),
    request_body = SyncPushRequest,
    responses(
        (status = 200, description = "Per-entry outcome of the batch", body = SyncPushResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn push(
    State(state): State<SyncHandlerState>,
    Extension(CurrentUser(requester)): Extension<CurrentUser>,
    ValidatedJson(request): ValidatedJson<SyncPushRequest>,
) -> ApiResult<Json<SyncPushResponse>> {
    let submissions = request.entries.into_iter().map(Into::into).collect();
    let outcome = state.sync.push(&requester, submissions).await;
    Ok(Json(SyncPushResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sync/pull",
    tag = "Sync",
    security(("bearer_auth" = [])),
    params(SyncPullParams),
    responses(
        (status = 200, description = "Visible entries changed since the watermark", body = EntryListResponse),
        (status = 400, description = "Malformed since parameter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn pull(
    State(state): State<SyncHandlerState>,
    Extension(CurrentUser(requester)): Extension<CurrentUser>,
    Query(params): Query<SyncPullParams>,
) -> ApiResult<Json<EntryListResponse>> {
    let since = parse_since(params.since.as_deref())?;
    let entries = state.sync.pull(&requester, since).await?;
    Ok(Json(EntryListResponse::from(entries)))
}

fn parse_since(raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| ApiError::bad_request("Invalid 'since' parameter format. Use RFC3339")),
    }
}
