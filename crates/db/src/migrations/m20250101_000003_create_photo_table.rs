//! Create photo table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Photo::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Photo::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Photo::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Photo::Title).string_len(256))
                    .col(ColumnDef::new(Photo::Description).text())
                    .col(ColumnDef::new(Photo::FileName).string_len(512).not_null())
                    .col(ColumnDef::new(Photo::PublicUrl).string_len(1024))
                    .col(ColumnDef::new(Photo::BlurUrl).string_len(1024))
                    .col(ColumnDef::new(Photo::ThumbnailUrl).string_len(1024))
                    .col(ColumnDef::new(Photo::Blurhash).string_len(128))
                    .col(
                        ColumnDef::new(Photo::Responsive)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Photo::IsPaidContent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Photo::Category).string_len(16).not_null())
                    .col(ColumnDef::new(Photo::AlbumId).string_len(32))
                    .col(ColumnDef::new(Photo::LikesCount).integer().not_null().default(0))
                    .col(ColumnDef::new(Photo::Price).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Photo::Currency)
                            .string_len(8)
                            .not_null()
                            .default("ARS"),
                    )
                    .col(
                        ColumnDef::new(Photo::MediaType)
                            .string_len(16)
                            .not_null()
                            .default("image"),
                    )
                    .col(
                        ColumnDef::new(Photo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_user")
                            .from(Photo::Table, Photo::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_album")
                            .from(Photo::Table, Photo::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (username, category) for gallery and posts listings
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_username_category")
                    .table(Photo::Table)
                    .col(Photo::Username)
                    .col(Photo::Category)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for the feed)
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_user_id")
                    .table(Photo::Table)
                    .col(Photo::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_album_id")
                    .table(Photo::Table)
                    .col(Photo::AlbumId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photo::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Photo {
    Table,
    Id,
    UserId,
    Username,
    Title,
    Description,
    FileName,
    PublicUrl,
    BlurUrl,
    ThumbnailUrl,
    Blurhash,
    Responsive,
    IsPaidContent,
    Category,
    AlbumId,
    LikesCount,
    Price,
    Currency,
    MediaType,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Album {
    Table,
    Id,
}
