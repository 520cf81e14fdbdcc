//! Checkpoint administration

use std::sync::Arc;

use tracing::info;

use crate::application::access::Scope;
use crate::domain::{Checkpoint, DomainError, DomainResult, RepositoryProvider, User};

/// Administrative edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CheckpointChanges {
    pub name: Option<String>,
    pub location: Option<String>,
}

pub struct CheckpointService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CheckpointService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, actor: &User) -> DomainResult<Vec<Checkpoint>> {
        Scope::Administration.require(actor)?;
        self.repos.checkpoints().list().await
    }

    pub async fn create(&self, actor: &User, checkpoint: Checkpoint) -> DomainResult<Checkpoint> {
        Scope::Administration.require(actor)?;

        let checkpoint = Checkpoint::new(
            checkpoint.checkpoint_id.trim(),
            checkpoint.name.trim(),
            checkpoint.location.trim(),
        );
        if checkpoint.checkpoint_id.is_empty() || checkpoint.name.is_empty() {
            return Err(DomainError::Validation(
                "Checkpoint ID and name are required".into(),
            ));
        }

        self.repos.checkpoints().insert(checkpoint.clone()).await?;
        info!(
            target: "audit",
            actor_id = %actor.user_id,
            checkpoint_id = %checkpoint.checkpoint_id,
            "Checkpoint created"
        );
        Ok(checkpoint)
    }

    pub async fn update(
        &self,
        actor: &User,
        checkpoint_id: &str,
        changes: CheckpointChanges,
    ) -> DomainResult<Checkpoint> {
        Scope::Administration.require(actor)?;

        let mut checkpoint = self
            .repos
            .checkpoints()
            .find_by_id(checkpoint_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Checkpoint", "checkpoint_id", checkpoint_id))?;

        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::Validation("Checkpoint name cannot be empty".into()));
            }
            checkpoint.name = name.to_string();
        }
        if let Some(location) = changes.location {
            checkpoint.location = location.trim().to_string();
        }

        self.repos.checkpoints().update(&checkpoint).await?;
        info!(
            target: "audit",
            actor_id = %actor.user_id,
            checkpoint_id,
            "Checkpoint updated"
        );
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::InMemoryStore;

    fn service() -> CheckpointService {
        CheckpointService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn admin_creates_and_edits_checkpoints() {
        let service = service();
        let admin = User::new("admin", "admin", UserRole::Admin);

        service
            .create(&admin, Checkpoint::new("CP-1", " Gate One ", "Sector 1"))
            .await
            .unwrap();
        let updated = service
            .update(
                &admin,
                "CP-1",
                CheckpointChanges {
                    location: Some("Sector 9".into()),
                    ..CheckpointChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated, Checkpoint::new("CP-1", "Gate One", "Sector 9"));
        assert_eq!(service.list(&admin).await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let service = service();
        let admin = User::new("admin", "admin", UserRole::Admin);
        let cp = Checkpoint::new("CP-1", "Gate", "Sector 1");

        service.create(&admin, cp.clone()).await.unwrap();
        assert!(matches!(
            service.create(&admin, cp).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn non_admins_are_forbidden() {
        let service = service();
        let sup = User::new("sup", "sup", UserRole::Supervisor);
        assert!(matches!(
            service.create(&sup, Checkpoint::new("CP-1", "Gate", "")).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            service.update(&sup, "CP-1", CheckpointChanges::default()).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn unknown_checkpoint_is_not_found() {
        let service = service();
        let admin = User::new("admin", "admin", UserRole::Admin);
        assert!(matches!(
            service.update(&admin, "CP-404", CheckpointChanges::default()).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
