//! Credential records
//!
//! Password digests live in their own partition and never leave the
//! authentication and reset flows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Inserts or replaces the digest for `user_id`.
    async fn store(&self, user_id: &str, password_hash: &str) -> DomainResult<()>;
    async fn find(&self, user_id: &str) -> DomainResult<Option<CredentialRecord>>;
    async fn delete(&self, user_id: &str) -> DomainResult<()>;
}
