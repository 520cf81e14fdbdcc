use async_trait::async_trait;

use super::Checkpoint;
use crate::domain::DomainResult;

#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Fails with `Conflict` when the id is taken.
    async fn insert(&self, checkpoint: Checkpoint) -> DomainResult<()>;
    async fn find_by_id(&self, checkpoint_id: &str) -> DomainResult<Option<Checkpoint>>;
    async fn list(&self) -> DomainResult<Vec<Checkpoint>>;
    /// Fails with `NotFound` for unknown ids.
    async fn update(&self, checkpoint: &Checkpoint) -> DomainResult<()>;
}
