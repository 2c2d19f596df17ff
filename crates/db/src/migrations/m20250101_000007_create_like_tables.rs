//! Create photo and album like tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhotoLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhotoLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhotoLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PhotoLike::PhotoId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PhotoLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_like_user")
                            .from(PhotoLike::Table, PhotoLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_like_photo")
                            .from(PhotoLike::Table, PhotoLike::PhotoId)
                            .to(Photo::Table, Photo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one like per user and photo
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_like_user_photo")
                    .table(PhotoLike::Table)
                    .col(PhotoLike::UserId)
                    .col(PhotoLike::PhotoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_like_photo_id")
                    .table(PhotoLike::Table)
                    .col(PhotoLike::PhotoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlbumLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AlbumLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(AlbumLike::AlbumId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(AlbumLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_like_user")
                            .from(AlbumLike::Table, AlbumLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_like_album")
                            .from(AlbumLike::Table, AlbumLike::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one like per user and album
        manager
            .create_index(
                Index::create()
                    .name("idx_album_like_user_album")
                    .table(AlbumLike::Table)
                    .col(AlbumLike::UserId)
                    .col(AlbumLike::AlbumId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_like_album_id")
                    .table(AlbumLike::Table)
                    .col(AlbumLike::AlbumId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlbumLike::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PhotoLike::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum PhotoLike {
    Table,
    Id,
    UserId,
    PhotoId,
    CreatedAt,
}

#[derive(Iden)]
enum AlbumLike {
    Table,
    Id,
    UserId,
    AlbumId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Photo {
    Table,
    Id,
}

#[derive(Iden)]
enum Album {
    Table,
    Id,
}
