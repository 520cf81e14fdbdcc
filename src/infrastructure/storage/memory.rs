//! In-memory storage implementation

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;

use crate::domain::{
    Checkpoint, CheckpointRepository, CredentialRecord, CredentialRepository, DomainError,
    DomainResult, Entry, EntryQuery, EntryRepository, RepositoryProvider, User, UserRepository,
};

/// In-memory storage for development and testing
///
/// `managed_operators` is never stored; it is rebuilt from the operators'
/// `supervisor_id` on every read, the same way the database store does it.
#[derive(Default)]
pub struct InMemoryStore {
    users: DashMap<String, User>,
    /// username -> user_id
    usernames: DashMap<String, String>,
    checkpoints: DashMap<String, Checkpoint>,
    entries: DashMap<String, Entry>,
    credentials: DashMap<String, CredentialRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn operators_of(&self, supervisor_id: &str) -> BTreeSet<String> {
        self.users
            .iter()
            .filter(|u| u.supervisor_id.as_deref() == Some(supervisor_id))
            .map(|u| u.user_id.clone())
            .collect()
    }

    fn hydrate(&self, mut user: User) -> User {
        user.managed_operators = self.operators_of(&user.user_id);
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, mut user: User) -> DomainResult<()> {
        if self.users.contains_key(&user.user_id) {
            return Err(DomainError::Conflict(format!(
                "User '{}' already exists",
                user.user_id
            )));
        }
        match self.usernames.entry(user.username.clone()) {
            MapEntry::Occupied(_) => {
                return Err(DomainError::Conflict("Username already exists".to_string()))
            }
            MapEntry::Vacant(slot) => {
                slot.insert(user.user_id.clone());
            }
        }
        user.managed_operators.clear();
        self.users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> DomainResult<Option<User>> {
        let user = self.users.get(user_id).map(|u| u.clone());
        Ok(user.map(|u| self.hydrate(u)))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let user_id = match self.usernames.get(username) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        UserRepository::find_by_id(self, &user_id).await
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();

        let mut managed: HashMap<String, BTreeSet<String>> = HashMap::new();
        for user in &users {
            if let Some(sup) = &user.supervisor_id {
                managed
                    .entry(sup.clone())
                    .or_default()
                    .insert(user.user_id.clone());
            }
        }

        let mut users: Vec<User> = users
            .into_iter()
            .map(|mut u| {
                u.managed_operators = managed.remove(&u.user_id).unwrap_or_default();
                u
            })
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn list_operator_ids(&self, supervisor_id: &str) -> DomainResult<Vec<String>> {
        Ok(self.operators_of(supervisor_id).into_iter().collect())
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let previous = self
            .users
            .get(&user.user_id)
            .map(|u| u.username.clone())
            .ok_or_else(|| DomainError::not_found("User", "user_id", &user.user_id))?;

        if previous != user.username {
            match self.usernames.entry(user.username.clone()) {
                MapEntry::Occupied(_) => {
                    return Err(DomainError::Conflict("Username already exists".to_string()))
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(user.user_id.clone());
                }
            }
            self.usernames.remove(&previous);
        }

        let mut stored = user.clone();
        stored.managed_operators.clear();
        self.users.insert(stored.user_id.clone(), stored);
        Ok(())
    }

    async fn set_supervisor(
        &self,
        operator_id: &str,
        supervisor_id: Option<&str>,
    ) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(operator_id)
            .ok_or_else(|| DomainError::not_found("User", "user_id", operator_id))?;
        user.supervisor_id = supervisor_id.map(str::to_string);
        Ok(())
    }

    async fn touch_last_login(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| DomainError::not_found("User", "user_id", user_id))?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> DomainResult<()> {
        let (_, user) = self
            .users
            .remove(user_id)
            .ok_or_else(|| DomainError::not_found("User", "user_id", user_id))?;
        self.usernames.remove(&user.username);
        Ok(())
    }
}

#[async_trait]
impl CheckpointRepository for InMemoryStore {
    async fn insert(&self, checkpoint: Checkpoint) -> DomainResult<()> {
        match self.checkpoints.entry(checkpoint.checkpoint_id.clone()) {
            MapEntry::Occupied(_) => Err(DomainError::Conflict(format!(
                "Checkpoint '{}' already exists",
                checkpoint.checkpoint_id
            ))),
            MapEntry::Vacant(slot) => {
                slot.insert(checkpoint);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, checkpoint_id: &str) -> DomainResult<Option<Checkpoint>> {
        Ok(self.checkpoints.get(checkpoint_id).map(|c| c.clone()))
    }

    async fn list(&self) -> DomainResult<Vec<Checkpoint>> {
        let mut checkpoints: Vec<Checkpoint> =
            self.checkpoints.iter().map(|c| c.value().clone()).collect();
        checkpoints.sort_by(|a, b| a.checkpoint_id.cmp(&b.checkpoint_id));
        Ok(checkpoints)
    }

    async fn update(&self, checkpoint: &Checkpoint) -> DomainResult<()> {
        let mut stored = self.checkpoints.get_mut(&checkpoint.checkpoint_id).ok_or_else(|| {
            DomainError::not_found("Checkpoint", "checkpoint_id", &checkpoint.checkpoint_id)
        })?;
        *stored = checkpoint.clone();
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for InMemoryStore {
    async fn find_by_record_id(&self, record_id: &str) -> DomainResult<Option<Entry>> {
        Ok(self.entries.get(record_id).map(|e| e.clone()))
    }

    async fn upsert(&self, entry: Entry) -> DomainResult<()> {
        self.entries.insert(entry.record_id.clone(), entry);
        Ok(())
    }

    async fn list(&self, query: &EntryQuery) -> DomainResult<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| query.updated_after.map_or(true, |since| e.updated_at > since))
            .filter(|e| {
                query
                    .checkpoint_id
                    .as_deref()
                    .map_or(true, |cp| e.checkpoint_id == cp)
            })
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            a.updated_at
                .cmp(&b.updated_at)
                .then_with(|| a.record_id.cmp(&b.record_id))
        });
        Ok(entries)
    }
}

#[async_trait]
impl CredentialRepository for InMemoryStore {
    async fn store(&self, user_id: &str, password_hash: &str) -> DomainResult<()> {
        self.credentials.insert(
            user_id.to_string(),
            CredentialRecord {
                user_id: user_id.to_string(),
                password_hash: password_hash.to_string(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find(&self, user_id: &str) -> DomainResult<Option<CredentialRecord>> {
        Ok(self.credentials.get(user_id).map(|c| c.clone()))
    }

    async fn delete(&self, user_id: &str) -> DomainResult<()> {
        self.credentials.remove(user_id);
        Ok(())
    }
}

impl RepositoryProvider for InMemoryStore {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn checkpoints(&self) -> &dyn CheckpointRepository {
        self
    }

    fn entries(&self) -> &dyn EntryRepository {
        self
    }

    fn credentials(&self) -> &dyn CredentialRepository {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryStatus, EntrySubmission, EntryType, UserRole};
    use chrono::{Duration, TimeZone};
    use serde_json::Map;

    fn entry(record_id: &str, checkpoint: &str, updated_at: DateTime<Utc>) -> Entry {
        let submission = EntrySubmission {
            record_id: record_id.into(),
            checkpoint_id: checkpoint.into(),
            entry_type: EntryType::Car,
            logging_user_id: "user-op-east".into(),
            client_timestamp: updated_at,
            status: EntryStatus::Active,
            payload: Map::new(),
        };
        Entry::from_submission(submission, updated_at, updated_at)
    }

    #[tokio::test]
    async fn managed_operators_are_derived_from_supervisor_links() {
        let store = InMemoryStore::new();
        let repos: &dyn RepositoryProvider = &store;

        repos
            .users()
            .insert(User::new("sup", "supervisor_john", UserRole::Supervisor))
            .await
            .unwrap();
        repos
            .users()
            .insert(User::new("op", "op_east", UserRole::GateOperator).with_supervisor("sup"))
            .await
            .unwrap();

        let sup = repos.users().find_by_id("sup").await.unwrap().unwrap();
        assert!(sup.manages("op"));

        repos.users().set_supervisor("op", None).await.unwrap();
        let sup = repos.users().find_by_id("sup").await.unwrap().unwrap();
        assert!(sup.managed_operators.is_empty());
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let store = InMemoryStore::new();
        let users = RepositoryProvider::users(&store);

        users
            .insert(User::new("a", "same", UserRole::Admin))
            .await
            .unwrap();
        let err = users
            .insert(User::new("b", "same", UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn rename_releases_old_username() {
        let store = InMemoryStore::new();
        let users = RepositoryProvider::users(&store);

        let mut user = User::new("a", "before", UserRole::Admin);
        users.insert(user.clone()).await.unwrap();
        user.username = "after".into();
        users.update(&user).await.unwrap();

        assert!(users.find_by_username("before").await.unwrap().is_none());
        assert_eq!(
            users.find_by_username("after").await.unwrap().unwrap().user_id,
            "a"
        );
    }

    #[tokio::test]
    async fn entries_are_filtered_and_ordered_by_update_time() {
        let store = InMemoryStore::new();
        let entries = RepositoryProvider::entries(&store);
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        entries.upsert(entry("late", "CP-A", base + Duration::seconds(20))).await.unwrap();
        entries.upsert(entry("early", "CP-A", base + Duration::seconds(10))).await.unwrap();
        entries.upsert(entry("other", "CP-B", base + Duration::seconds(15))).await.unwrap();
        entries.upsert(entry("stale", "CP-A", base)).await.unwrap();

        let since = entries.list(&EntryQuery::updated_after(base)).await.unwrap();
        let ids: Vec<_> = since.iter().map(|e| e.record_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "other", "late"]);

        let query = EntryQuery {
            checkpoint_id: Some("CP-B".into()),
            ..EntryQuery::all()
        };
        let only_b = entries.list(&query).await.unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].record_id, "other");
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = InMemoryStore::new();
        let err = RepositoryProvider::users(&store).delete("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = RepositoryProvider::checkpoints(&store)
            .update(&Checkpoint::new("CP-X", "X", "Nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
