//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod checkpoint_repository;
pub mod credential_repository;
pub mod entry_repository;
pub mod repository_provider;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use crate::domain::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Internal(format!("Database error: {}", e))
}

/// Maps unique-constraint violations to `Conflict`, everything else to `Internal`.
pub(crate) fn db_err_or_conflict(e: sea_orm::DbErr, conflict: &str) -> DomainError {
    let text = e.to_string();
    if text.contains("UNIQUE") || text.contains("duplicate") {
        DomainError::Conflict(conflict.to_string())
    } else {
        db_err(e)
    }
}
