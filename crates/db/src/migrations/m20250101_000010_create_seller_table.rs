//! Create seller table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Seller::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Seller::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Seller::SellerId)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Seller::AccessToken).string_len(512).not_null())
                    .col(ColumnDef::new(Seller::RefreshToken).string_len(512))
                    .col(ColumnDef::new(Seller::MpUserId).string_len(64).not_null())
                    .col(ColumnDef::new(Seller::ExpiresIn).big_integer())
                    .col(ColumnDef::new(Seller::SiteId).string_len(8))
                    .col(
                        ColumnDef::new(Seller::ObtainedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seller::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Seller {
    Table,
    Id,
    SellerId,
    AccessToken,
    RefreshToken,
    MpUserId,
    ExpiresIn,
    SiteId,
    ObtainedAt,
}
