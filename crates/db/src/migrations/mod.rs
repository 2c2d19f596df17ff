//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_user_table;
mod m20250101_000002_create_album_table;
mod m20250101_000003_create_photo_table;
mod m20250101_000004_create_following_table;
mod m20250101_000005_create_blocking_table;
mod m20250101_000006_create_notification_table;
mod m20250101_000007_create_like_tables;
mod m20250101_000008_create_comment_table;
mod m20250101_000009_create_unlock_tables;
mod m20250101_000010_create_seller_table;
mod m20250101_000011_create_report_and_support_tables;
mod m20250101_000012_create_chat_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_user_table::Migration),
            Box::new(m20250101_000002_create_album_table::Migration),
            Box::new(m20250101_000003_create_photo_table::Migration),
            Box::new(m20250101_000004_create_following_table::Migration),
            Box::new(m20250101_000005_create_blocking_table::Migration),
            Box::new(m20250101_000006_create_notification_table::Migration),
            Box::new(m20250101_000007_create_like_tables::Migration),
            Box::new(m20250101_000008_create_comment_table::Migration),
            Box::new(m20250101_000009_create_unlock_tables::Migration),
            Box::new(m20250101_000010_create_seller_table::Migration),
            Box::new(m20250101_000011_create_report_and_support_tables::Migration),
            Box::new(m20250101_000012_create_chat_tables::Migration),
        ]
    }
}
