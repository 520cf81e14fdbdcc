//! SeaORM implementation of CredentialRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use super::db_err;
use crate::domain::{CredentialRecord, CredentialRepository, DomainResult};
use crate::infrastructure::database::entities::credential;

pub struct SeaOrmCredentialRepository {
    db: DatabaseConnection,
}

impl SeaOrmCredentialRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialRepository for SeaOrmCredentialRepository {
    async fn store(&self, user_id: &str, password_hash: &str) -> DomainResult<()> {
        let model = credential::ActiveModel {
            user_id: Set(user_id.to_string()),
            password_hash: Set(password_hash.to_string()),
            updated_at: Set(Utc::now()),
        };

        credential::Entity::insert(model)
            .on_conflict(
                OnConflict::column(credential::Column::UserId)
                    .update_columns([credential::Column::PasswordHash, credential::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find(&self, user_id: &str) -> DomainResult<Option<CredentialRecord>> {
        let model = credential::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(|m| CredentialRecord {
            user_id: m.user_id,
            password_hash: m.password_hash,
            updated_at: m.updated_at,
        }))
    }

    async fn delete(&self, user_id: &str) -> DomainResult<()> {
        credential::Entity::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
