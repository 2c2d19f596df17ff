//! Create unlock tables migration.
//!
//! Rows are only ever inserted with `ON CONFLICT DO NOTHING`, so the unique
//! pair index makes repeated unlocks a no-op.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhotoUnlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhotoUnlock::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhotoUnlock::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PhotoUnlock::PhotoId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PhotoUnlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_unlock_user")
                            .from(PhotoUnlock::Table, PhotoUnlock::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_unlock_photo")
                            .from(PhotoUnlock::Table, PhotoUnlock::PhotoId)
                            .to(Photo::Table, Photo::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: the unlock set of a photo
        manager
            .create_index(
                Index::create()
                    .name("idx_photo_unlock_user_photo")
                    .table(PhotoUnlock::Table)
                    .col(PhotoUnlock::UserId)
                    .col(PhotoUnlock::PhotoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photo_unlock_photo_id")
                    .table(PhotoUnlock::Table)
                    .col(PhotoUnlock::PhotoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumUnlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlbumUnlock::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AlbumUnlock::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(AlbumUnlock::AlbumId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(AlbumUnlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_unlock_user")
                            .from(AlbumUnlock::Table, AlbumUnlock::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_album_unlock_album")
                            .from(AlbumUnlock::Table, AlbumUnlock::AlbumId)
                            .to(Album::Table, Album::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: the unlock set of an album
        manager
            .create_index(
                Index::create()
                    .name("idx_album_unlock_user_album")
                    .table(AlbumUnlock::Table)
                    .col(AlbumUnlock::UserId)
                    .col(AlbumUnlock::AlbumId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_unlock_album_id")
                    .table(AlbumUnlock::Table)
                    .col(AlbumUnlock::AlbumId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlbumUnlock::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PhotoUnlock::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum PhotoUnlock {
    Table,
    Id,
    UserId,
    PhotoId,
    CreatedAt,
}

#[derive(Iden)]
enum AlbumUnlock {
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
