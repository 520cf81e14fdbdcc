//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    CheckpointRepository, CredentialRepository, EntryRepository, RepositoryProvider,
    UserRepository,
};

use super::checkpoint_repository::SeaOrmCheckpointRepository;
use super::credential_repository::SeaOrmCredentialRepository;
use super::entry_repository::SeaOrmEntryRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let user = repos.users().find_by_username("op_east").await?;
/// let entries = repos.entries().list(&EntryQuery::all()).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    checkpoints: SeaOrmCheckpointRepository,
    entries: SeaOrmEntryRepository,
    credentials: SeaOrmCredentialRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            checkpoints: SeaOrmCheckpointRepository::new(db.clone()),
            entries: SeaOrmEntryRepository::new(db.clone()),
            credentials: SeaOrmCredentialRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn checkpoints(&self) -> &dyn CheckpointRepository {
        &self.checkpoints
    }

    fn entries(&self) -> &dyn EntryRepository {
        &self.entries
    }

    fn credentials(&self) -> &dyn CredentialRepository {
        &self.credentials
    }
}
