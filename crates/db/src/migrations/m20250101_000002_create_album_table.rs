//! Create album table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Album::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Album::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Album::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Album::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Album::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Album::Description).text())
                    .col(ColumnDef::new(Album::Price).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Album::Currency)
                            .string_len(8)
                            .not_null()
                            .default("ARS"),
                    )
                    .col(ColumnDef::new(Album::LikesCount).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Album::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_user")
                            .from(Album::Table, Album::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_user_id")
                    .table(Album::Table)
                    .col(Album::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Album::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Album {
    Table,
    Id,
    UserId,
    Username,
    Title,
    Description,
    Price,
    Currency,
    LikesCount,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
