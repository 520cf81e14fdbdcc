//! SeaORM implementation of EntryRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::{Map, Value};

use super::db_err;
use crate::domain::{
    DomainError, DomainResult, Entry, EntryQuery, EntryRepository, EntryStatus, EntryType,
};
use crate::infrastructure::database::entities::entry;

pub struct SeaOrmEntryRepository {
    db: DatabaseConnection,
}

impl SeaOrmEntryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn type_to_domain(t: entry::EntryType) -> EntryType {
    match t {
        entry::EntryType::Personnel => EntryType::Personnel,
        entry::EntryType::Truck => EntryType::Truck,
        entry::EntryType::Car => EntryType::Car,
        entry::EntryType::Other => EntryType::Other,
    }
}

fn type_to_entity(t: EntryType) -> entry::EntryType {
    match t {
        EntryType::Personnel => entry::EntryType::Personnel,
        EntryType::Truck => entry::EntryType::Truck,
        EntryType::Car => entry::EntryType::Car,
        EntryType::Other => entry::EntryType::Other,
    }
}

fn status_to_domain(s: entry::EntryStatus) -> EntryStatus {
    match s {
        entry::EntryStatus::Active => EntryStatus::Active,
        entry::EntryStatus::Deleted => EntryStatus::Deleted,
    }
}

fn status_to_entity(s: EntryStatus) -> entry::EntryStatus {
    match s {
        EntryStatus::Active => entry::EntryStatus::Active,
        EntryStatus::Deleted => entry::EntryStatus::Deleted,
    }
}

fn model_to_domain(model: entry::Model) -> DomainResult<Entry> {
    let payload: Map<String, Value> = serde_json::from_str(&model.payload).map_err(|e| {
        DomainError::Internal(format!("Corrupt payload for entry {}: {}", model.record_id, e))
    })?;

    Ok(Entry {
        record_id: model.record_id,
        checkpoint_id: model.checkpoint_id,
        entry_type: type_to_domain(model.entry_type),
        logging_user_id: model.logging_user_id,
        client_timestamp: model.client_timestamp,
        created_at: model.created_at,
        updated_at: model.updated_at,
        status: status_to_domain(model.status),
        payload,
    })
}

#[async_trait]
impl EntryRepository for SeaOrmEntryRepository {
    async fn find_by_record_id(&self, record_id: &str) -> DomainResult<Option<Entry>> {
        entry::Entity::find_by_id(record_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(model_to_domain)
            .transpose()
    }

    async fn upsert(&self, e: Entry) -> DomainResult<()> {
        let payload =
            serde_json::to_string(&e.payload).map_err(|err| DomainError::Internal(err.to_string()))?;

        let model = entry::ActiveModel {
            record_id: Set(e.record_id),
            checkpoint_id: Set(e.checkpoint_id),
            entry_type: Set(type_to_entity(e.entry_type)),
            logging_user_id: Set(e.logging_user_id),
            client_timestamp: Set(e.client_timestamp),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
            status: Set(status_to_entity(e.status)),
            payload: Set(payload),
        };

        entry::Entity::insert(model)
            .on_conflict(
                OnConflict::column(entry::Column::RecordId)
                    .update_columns([
                        entry::Column::CheckpointId,
                        entry::Column::EntryType,
                        entry::Column::LoggingUserId,
                        entry::Column::ClientTimestamp,
                        entry::Column::CreatedAt,
                        entry::Column::UpdatedAt,
                        entry::Column::Status,
                        entry::Column::Payload,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list(&self, query: &EntryQuery) -> DomainResult<Vec<Entry>> {
        let mut select = entry::Entity::find();
        if let Some(since) = query.updated_after {
            select = select.filter(entry::Column::UpdatedAt.gt(since));
        }
        if let Some(cp) = &query.checkpoint_id {
            select = select.filter(entry::Column::CheckpointId.eq(cp.as_str()));
        }

        select
            .order_by_asc(entry::Column::UpdatedAt)
            .order_by_asc(entry::Column::RecordId)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(model_to_domain)
            .collect()
    }
}
