use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::User;
use crate::domain::DomainResult;

/// Persistence of user accounts.
///
/// Implementations populate `User::managed_operators` on every read from the
/// operators' `supervisor_id` column and ignore it on write.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the id or username is taken.
    async fn insert(&self, user: User) -> DomainResult<()>;

    async fn find_by_id(&self, user_id: &str) -> DomainResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn list(&self) -> DomainResult<Vec<User>>;
    async fn count(&self) -> DomainResult<u64>;

    /// Ids of the operators whose `supervisor_id` is `supervisor_id`.
    async fn list_operator_ids(&self, supervisor_id: &str) -> DomainResult<Vec<String>>;

    /// Replaces the stored record. Fails with `NotFound` for unknown ids.
    async fn update(&self, user: &User) -> DomainResult<()>;
    async fn set_supervisor(&self, operator_id: &str, supervisor_id: Option<&str>) -> DomainResult<()>;
    async fn touch_last_login(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()>;

    /// Fails with `NotFound` for unknown ids.
    async fn delete(&self, user_id: &str) -> DomainResult<()>;
}
