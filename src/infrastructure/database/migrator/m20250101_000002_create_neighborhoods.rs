//! Create neighborhoods table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Neighborhoods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Neighborhoods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Neighborhoods::Name).string().not_null())
                    .col(ColumnDef::new(Neighborhoods::PostalCode).string())
                    .col(ColumnDef::new(Neighborhoods::SettlementKind).string())
                    .col(ColumnDef::new(Neighborhoods::Municipality).string())
                    .col(ColumnDef::new(Neighborhoods::State).string())
                    .col(ColumnDef::new(Neighborhoods::City).string())
                    .to_owned(),
            )
            .await?;

        // Batch import dedupes on (name, postal_code)
        manager
            .create_index(
                Index::create()
                    .name("idx_neighborhoods_name_postal_code")
                    .table(Neighborhoods::Table)
                    .col(Neighborhoods::Name)
                    .col(Neighborhoods::PostalCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Neighborhoods::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Neighborhoods {
    Table,
    Id,
    Name,
    PostalCode,
    SettlementKind,
    Municipality,
    State,
    City,
}
