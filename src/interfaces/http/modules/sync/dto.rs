//! Sync DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::PushOutcome;
use crate::domain::{Entry, EntryStatus, EntrySubmission, EntryType};

/// Entry as pushed by a client. Server timestamps in the body are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EntryInput {
    #[serde(default)]
    pub record_id: String,
    pub checkpoint_id: String,
    #[schema(value_type = String, example = "TRUCK")]
    pub entry_type: EntryType,
    pub logging_user_id: String,
    #[serde(rename = "client_ts", alias = "client_timestamp")]
    pub client_timestamp: DateTime<Utc>,
    #[serde(default)]
    #[schema(value_type = String, example = "ACTIVE")]
    pub status: EntryStatus,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
}

impl From<EntryInput> for EntrySubmission {
    fn from(e: EntryInput) -> Self {
        Self {
            record_id: e.record_id,
            checkpoint_id: e.checkpoint_id,
            entry_type: e.entry_type,
            logging_user_id: e.logging_user_id,
            client_timestamp: e.client_timestamp,
            status: e.status,
            payload: e.payload,
        }
    }
}

/// Stored entry as returned by pull and review endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryDto {
    pub record_id: String,
    pub checkpoint_id: String,
    #[schema(value_type = String, example = "TRUCK")]
    pub entry_type: EntryType,
    pub logging_user_id: String,
    #[serde(rename = "client_ts", alias = "client_timestamp")]
    pub client_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[schema(value_type = String, example = "ACTIVE")]
    pub status: EntryStatus,
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
}

impl From<Entry> for EntryDto {
    fn from(e: Entry) -> Self {
        Self {
            record_id: e.record_id,
            checkpoint_id: e.checkpoint_id,
            entry_type: e.entry_type,
            logging_user_id: e.logging_user_id,
            client_timestamp: e.client_timestamp,
            created_at: e.created_at,
            updated_at: e.updated_at,
            status: e.status,
            payload: e.payload,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SyncPushRequest {
    #[serde(default)]
    pub entries: Vec<EntryInput>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncPushResponse {
    pub success: bool,
    pub accepted: usize,
    pub rejected: usize,
    pub rejected_ids: Vec<String>,
    pub message: String,
}

impl From<PushOutcome> for SyncPushResponse {
    fn from(o: PushOutcome) -> Self {
        Self {
            success: o.success(),
            accepted: o.accepted,
            rejected: o.rejected(),
            rejected_ids: o.rejected_ids,
            message: "Sync completed".to_string(),
        }
    }
}

/// `since` is parsed by the handler so a malformed value gets a clear 400.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SyncPullParams {
    /// RFC 3339 watermark; entries updated strictly after it are returned
    pub since: Option<String>,
}

/// Entry list body shared by pull and supervisor review
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryListResponse {
    pub entries: Vec<EntryDto>,
    pub count: usize,
}

impl From<Vec<Entry>> for EntryListResponse {
    fn from(entries: Vec<Entry>) -> Self {
        let entries: Vec<EntryDto> = entries.into_iter().map(EntryDto::from).collect();
        Self {
            count: entries.len(),
            entries,
        }
    }
}
