//! Create activities table

use sea_orm_migration::prelude::*;

use super::m20250101_000004_create_crews::Crews;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Activities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Activities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Activities::Name).string().not_null())
                    .col(ColumnDef::new(Activities::Neighborhood).string().not_null())
                    .col(ColumnDef::new(Activities::CrewId).integer().not_null())
                    .col(
                        ColumnDef::new(Activities::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Activities::State)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activities_crew_id")
                            .from(Activities::Table, Activities::CrewId)
                            .to(Crews::Table, Crews::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Activities {
    Table,
    Id,
    Name,
    Neighborhood,
    CrewId,
    ScheduledAt,
    State,
}
