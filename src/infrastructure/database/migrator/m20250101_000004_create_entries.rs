//! Create entries table migration
//!
//! No foreign keys: entries reference checkpoints and users by id only and
//! outlive both.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::RecordId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::CheckpointId).string().not_null())
                    .col(ColumnDef::new(Entries::EntryType).string_len(20).not_null())
                    .col(ColumnDef::new(Entries::LoggingUserId).string().not_null())
                    .col(
                        ColumnDef::new(Entries::ClientTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Entries::Status)
                            .string_len(20)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Entries::Payload)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .to_owned(),
            )
            .await?;

        // Pull filters on updated_at
        manager
            .create_index(
                Index::create()
                    .name("idx_entries_updated_at")
                    .table(Entries::Table)
                    .col(Entries::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_logging_user_id")
                    .table(Entries::Table)
                    .col(Entries::LoggingUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_checkpoint_id")
                    .table(Entries::Table)
                    .col(Entries::CheckpointId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Entries {
    Table,
    RecordId,
    CheckpointId,
    EntryType,
    LoggingUserId,
    ClientTimestamp,
    CreatedAt,
    UpdatedAt,
    Status,
    Payload,
}
