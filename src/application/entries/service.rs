//! Entry review for supervisors and admins

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::export::{entries_to_csv, export_filename};
use crate::application::access::{visible_entries, Scope};
use crate::domain::{DomainResult, Entry, EntryQuery, RepositoryProvider, User};

/// A rendered CSV attachment
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub body: Vec<u8>,
    pub rows: usize,
}

pub struct EntryService {
    repos: Arc<dyn RepositoryProvider>,
}

impl EntryService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Role-filtered entries, optionally narrowed to one checkpoint.
    pub async fn list(&self, actor: &User, checkpoint_id: Option<String>) -> DomainResult<Vec<Entry>> {
        Scope::Review.require(actor)?;
        let query = EntryQuery {
            checkpoint_id: checkpoint_id.filter(|id| !id.is_empty()),
            ..EntryQuery::all()
        };
        let entries = self.repos.entries().list(&query).await?;
        Ok(visible_entries(entries, actor))
    }

    pub async fn export_csv(&self, actor: &User) -> DomainResult<CsvExport> {
        let entries = self.list(actor, None).await?;
        let body = entries_to_csv(&entries)?;

        info!(
            target: "audit",
            actor_id = %actor.user_id,
            rows = entries.len(),
            "Entries exported"
        );
        Ok(CsvExport {
            filename: export_filename(Utc::now()),
            body,
            rows: entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::domain::{DomainError, EntryStatus, EntrySubmission, EntryType, UserRole};
    use crate::infrastructure::InMemoryStore;

    async fn seeded() -> (EntryService, User) {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        for (id, author, cp) in [
            ("e1", "op-east", "CP-EAST-MAIN"),
            ("e2", "op-west", "CP-WEST-GATE"),
            ("e3", "op-east", "CP-NORTH-01"),
        ] {
            let sub = EntrySubmission {
                record_id: id.into(),
                checkpoint_id: cp.into(),
                entry_type: EntryType::Personnel,
                logging_user_id: author.into(),
                client_timestamp: now,
                status: EntryStatus::Active,
                payload: Map::new(),
            };
            store
                .entries()
                .upsert(Entry::from_submission(sub, now, now))
                .await
                .unwrap();
        }

        let mut sup = User::new("sup", "sup", UserRole::Supervisor);
        sup.managed_operators.insert("op-east".into());
        (EntryService::new(store), sup)
    }

    #[tokio::test]
    async fn supervisor_list_is_filtered_and_narrowable() {
        let (service, sup) = seeded().await;
        assert_eq!(service.list(&sup, None).await.unwrap().len(), 2);

        let north = service.list(&sup, Some("CP-NORTH-01".into())).await.unwrap();
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].record_id, "e3");
    }

    #[tokio::test]
    async fn export_counts_visible_rows_only() {
        let (service, sup) = seeded().await;
        let export = service.export_csv(&sup).await.unwrap();
        assert_eq!(export.rows, 2);
        assert!(export.filename.starts_with("gatekeeper_entries_"));
        assert_eq!(String::from_utf8(export.body).unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn operators_cannot_review() {
        let (service, _) = seeded().await;
        let op = User::new("op-east", "op_east", UserRole::GateOperator);
        assert!(matches!(
            service.list(&op, None).await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
