//! Sync Reconciler: batch push and delta pull
//!
//! Stateless between calls. Each pushed entry is authorized and persisted on
//! its own, so one bad entry never fails the batch. Conflicts resolve by the
//! server-assigned `updated_at` in receipt order; there is no version check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::application::access::{authorize_push, visible_entries};
use crate::domain::{
    DomainResult, Entry, EntryQuery, EntrySubmission, RepositoryProvider, User,
};

/// Per-batch push result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushOutcome {
    pub accepted: usize,
    pub rejected_ids: Vec<String>,
}

impl PushOutcome {
    pub fn rejected(&self) -> usize {
        self.rejected_ids.len()
    }

    pub fn success(&self) -> bool {
        self.rejected_ids.is_empty()
    }

    fn reject(&mut self, record_id: String) {
        self.rejected_ids.push(record_id);
    }
}

pub struct SyncService {
    repos: Arc<dyn RepositoryProvider>,
}

impl SyncService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Apply a batch in submission order.
    pub async fn push(&self, requester: &User, entries: Vec<EntrySubmission>) -> PushOutcome {
        let mut outcome = PushOutcome::default();

        for entry in entries {
            if let Err(reason) = authorize_push(requester, &entry) {
                warn!(
                    target: "audit",
                    user_id = %requester.user_id,
                    record_id = %entry.record_id,
                    %reason,
                    "Push entry rejected"
                );
                outcome.reject(entry.record_id);
                continue;
            }

            let record_id = entry.record_id.clone();
            match self.persist(entry).await {
                Ok(()) => outcome.accepted += 1,
                Err(e) => {
                    error!(record_id = %record_id, error = %e, "Failed to persist entry");
                    outcome.reject(record_id);
                }
            }
        }

        metrics::counter!("sync_push_entries_total", "outcome" => "accepted")
            .increment(outcome.accepted as u64);
        metrics::counter!("sync_push_entries_total", "outcome" => "rejected")
            .increment(outcome.rejected() as u64);

        info!(
            user_id = %requester.user_id,
            accepted = outcome.accepted,
            rejected = outcome.rejected(),
            "Push processed"
        );
        outcome
    }

    /// Entries visible to `requester` updated strictly after `since`,
    /// ordered by `updated_at`.
    pub async fn pull(
        &self,
        requester: &User,
        since: Option<DateTime<Utc>>,
    ) -> DomainResult<Vec<Entry>> {
        let query = since.map(EntryQuery::updated_after).unwrap_or_default();
        let entries = self.repos.entries().list(&query).await?;
        let visible = visible_entries(entries, requester);

        metrics::counter!("sync_pull_entries_total").increment(visible.len() as u64);
        info!(
            user_id = %requester.user_id,
            since = ?since,
            count = visible.len(),
            "Pull processed"
        );
        Ok(visible)
    }

    async fn persist(&self, entry: EntrySubmission) -> DomainResult<()> {
        let previous = self.repos.entries().find_by_record_id(&entry.record_id).await?;

        if let Some(prev) = &previous {
            if prev.has_same_content(&entry) {
                debug!(record_id = %entry.record_id, "Identical entry already stored");
                return Ok(());
            }
        }

        let now = Utc::now();
        let (created_at, updated_at) = match previous {
            Some(prev) => (prev.created_at, prev.updated_at.max(now)),
            None => (now, now),
        };

        self.repos
            .entries()
            .upsert(Entry::from_submission(entry, created_at, updated_at))
            .await
    }
}
