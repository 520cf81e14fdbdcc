use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Entry;
use crate::domain::DomainResult;

/// Equality/range predicates understood by entry stores.
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    /// Strictly greater than
    pub updated_after: Option<DateTime<Utc>>,
    pub checkpoint_id: Option<String>,
}

impl EntryQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn updated_after(since: DateTime<Utc>) -> Self {
        Self {
            updated_after: Some(since),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn find_by_record_id(&self, record_id: &str) -> DomainResult<Option<Entry>>;

    /// Inserts or fully replaces the record keyed by `record_id`.
    async fn upsert(&self, entry: Entry) -> DomainResult<()>;

    /// Matching entries ordered by `updated_at`, then `record_id`.
    async fn list(&self, query: &EntryQuery) -> DomainResult<Vec<Entry>>;
}
