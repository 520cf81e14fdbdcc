//! SeaORM implementation of CheckpointRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::{db_err, db_err_or_conflict};
use crate::domain::{Checkpoint, CheckpointRepository, DomainError, DomainResult};
use crate::infrastructure::database::entities::checkpoint;

pub struct SeaOrmCheckpointRepository {
    db: DatabaseConnection,
}

impl SeaOrmCheckpointRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(model: checkpoint::Model) -> Checkpoint {
    Checkpoint {
        checkpoint_id: model.checkpoint_id,
        name: model.name,
        location: model.location,
    }
}

fn to_active_model(cp: &Checkpoint) -> checkpoint::ActiveModel {
    checkpoint::ActiveModel {
        checkpoint_id: Set(cp.checkpoint_id.clone()),
        name: Set(cp.name.clone()),
        location: Set(cp.location.clone()),
    }
}

#[async_trait]
impl CheckpointRepository for SeaOrmCheckpointRepository {
    async fn insert(&self, cp: Checkpoint) -> DomainResult<()> {
        let conflict = format!("Checkpoint '{}' already exists", cp.checkpoint_id);
        if self.find_by_id(&cp.checkpoint_id).await?.is_some() {
            return Err(DomainError::Conflict(conflict));
        }

        to_active_model(&cp)
            .insert(&self.db)
            .await
            .map_err(|e| db_err_or_conflict(e, &conflict))?;
        Ok(())
    }

    async fn find_by_id(&self, checkpoint_id: &str) -> DomainResult<Option<Checkpoint>> {
        let model = checkpoint::Entity::find_by_id(checkpoint_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list(&self) -> DomainResult<Vec<Checkpoint>> {
        let models = checkpoint::Entity::find()
            .order_by_asc(checkpoint::Column::CheckpointId)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, cp: &Checkpoint) -> DomainResult<()> {
        if self.find_by_id(&cp.checkpoint_id).await?.is_none() {
            return Err(DomainError::not_found(
                "Checkpoint",
                "checkpoint_id",
                &cp.checkpoint_id,
            ));
        }

        to_active_model(cp).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
