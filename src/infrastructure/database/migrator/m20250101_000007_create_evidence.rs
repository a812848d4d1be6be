//! Create evidence table

use sea_orm_migration::prelude::*;

use super::m20250101_000006_create_activities::Activities;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EvidenceTable::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvidenceTable::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvidenceTable::ActivityId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvidenceTable::ImagePath).string().not_null())
                    .col(
                        ColumnDef::new(EvidenceTable::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evidence_activity_id")
                            .from(EvidenceTable::Table, EvidenceTable::ActivityId)
                            .to(Activities::Table, Activities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EvidenceTable::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum EvidenceTable {
    #[iden = "evidence"]
    Table,
    Id,
    ActivityId,
    ImagePath,
    UploadedAt,
}
