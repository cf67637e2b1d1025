use sea_orm_migration::prelude::*;

use super::m20260805_000003_create_books::Books;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(BookMedia::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(BookMedia::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(BookMedia::BookId).integer().not_null())
          .col(ColumnDef::new(BookMedia::Url).string().not_null())
          .col(ColumnDef::new(BookMedia::MediaType).string().not_null())
          .col(ColumnDef::new(BookMedia::UploadedDate).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_book_media_book")
              .from(BookMedia::Table, BookMedia::BookId)
              .to(Books::Table, Books::BookId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(BookMedia::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum BookMedia {
  Table,
  Id,
  BookId,
  Url,
  MediaType,
  UploadedDate,
}
