use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_users::Users;
use super::m20260805_000003_create_books::Books;
use super::m20260805_000004_create_chapters::Chapters;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ReadingHistories::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ReadingHistories::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(ReadingHistories::UserId).string().not_null())
          .col(ColumnDef::new(ReadingHistories::BookId).integer().not_null())
          .col(ColumnDef::new(ReadingHistories::ChapterId).integer().not_null())
          .col(
            ColumnDef::new(ReadingHistories::AccessTime)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_reading_histories_user")
              .from(ReadingHistories::Table, ReadingHistories::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_reading_histories_book")
              .from(ReadingHistories::Table, ReadingHistories::BookId)
              .to(Books::Table, Books::BookId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_reading_histories_chapter")
              .from(ReadingHistories::Table, ReadingHistories::ChapterId)
              .to(Chapters::Table, Chapters::ChapterId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // one "continue reading" pointer per (user, book)
    manager
      .create_index(
        Index::create()
          .name("idx_reading_histories_user_book")
          .table(ReadingHistories::Table)
          .col(ReadingHistories::UserId)
          .col(ReadingHistories::BookId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ReadingHistories::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ReadingHistories {
  Table,
  Id,
  UserId,
  BookId,
  ChapterId,
  AccessTime,
}
