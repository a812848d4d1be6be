//! Create crews table

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_neighborhoods::Neighborhoods;
use super::m20250101_000003_create_crew_leaders::CrewLeaders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Crews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Crews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Crews::Name).string().not_null())
                    .col(ColumnDef::new(Crews::LeaderId).integer())
                    .col(ColumnDef::new(Crews::NeighborhoodId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crews_leader_id")
                            .from(Crews::Table, Crews::LeaderId)
                            .to(CrewLeaders::Table, CrewLeaders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_crews_neighborhood_id")
                            .from(Crews::Table, Crews::NeighborhoodId)
                            .to(Neighborhoods::Table, Neighborhoods::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Crews::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Crews {
    Table,
    Id,
    Name,
    LeaderId,
    NeighborhoodId,
}
