//! Checkpoint entry model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category of a logged passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Personnel,
    Truck,
    Car,
    Other,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personnel => "PERSONNEL",
            Self::Truck => "TRUCK",
            Self::Car => "CAR",
            Self::Other => "OTHER",
        }
    }
}

/// Soft-delete marker. Clients never hard-delete entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    #[default]
    Active,
    Deleted,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deleted => "DELETED",
        }
    }
}

/// Entry as submitted by a client during a push.
///
/// Carries no server timestamps: those are assigned on persist.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySubmission {
    /// Client-generated unique id, the sync key
    pub record_id: String,
    pub checkpoint_id: String,
    pub entry_type: EntryType,
    pub logging_user_id: String,
    /// Descriptive only, never used for ordering
    pub client_timestamp: DateTime<Utc>,
    pub status: EntryStatus,
    pub payload: Map<String, Value>,
}

/// A persisted entry.
///
/// `updated_at` is server-authoritative, non-decreasing per record and the
/// only input to conflict resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub record_id: String,
    pub checkpoint_id: String,
    pub entry_type: EntryType,
    pub logging_user_id: String,
    pub client_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: EntryStatus,
    pub payload: Map<String, Value>,
}

impl Entry {
    pub fn from_submission(
        submission: EntrySubmission,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: submission.record_id,
            checkpoint_id: submission.checkpoint_id,
            entry_type: submission.entry_type,
            logging_user_id: submission.logging_user_id,
            client_timestamp: submission.client_timestamp,
            created_at,
            updated_at,
            status: submission.status,
            payload: submission.payload,
        }
    }

    /// Whether storing `submission` would leave this record unchanged.
    pub fn has_same_content(&self, submission: &EntrySubmission) -> bool {
        self.record_id == submission.record_id
            && self.checkpoint_id == submission.checkpoint_id
            && self.entry_type == submission.entry_type
            && self.logging_user_id == submission.logging_user_id
            && self.client_timestamp == submission.client_timestamp
            && self.status == submission.status
            && self.payload == submission.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> EntrySubmission {
        let mut payload = Map::new();
        payload.insert("plate".into(), Value::String("01A123BC".into()));
        EntrySubmission {
            record_id: "rec-1".into(),
            checkpoint_id: "CP-1".into(),
            entry_type: EntryType::Truck,
            logging_user_id: "op-1".into(),
            client_timestamp: Utc::now(),
            status: EntryStatus::Active,
            payload,
        }
    }

    #[test]
    fn content_comparison_ignores_server_timestamps() {
        let sub = submission();
        let stored = Entry::from_submission(sub.clone(), Utc::now(), Utc::now());
        assert!(stored.has_same_content(&sub));

        let mut edited = sub;
        edited.status = EntryStatus::Deleted;
        assert!(!stored.has_same_content(&edited));
    }

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(serde_json::to_string(&EntryType::Personnel).unwrap(), "\"PERSONNEL\"");
        assert_eq!(serde_json::to_string(&EntryStatus::Deleted).unwrap(), "\"DELETED\"");
        assert_eq!(EntryStatus::default(), EntryStatus::Active);
    }
}
