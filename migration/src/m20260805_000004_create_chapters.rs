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
          .table(Chapters::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Chapters::ChapterId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Chapters::BookId).integer().not_null())
          .col(ColumnDef::new(Chapters::Title).string().not_null())
          .col(ColumnDef::new(Chapters::Content).string().null())
          .col(ColumnDef::new(Chapters::ChapterOrder).integer().not_null())
          .col(
            ColumnDef::new(Chapters::IsFree)
              .boolean()
              .not_null()
              .default(false),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_chapters_book")
              .from(Chapters::Table, Chapters::BookId)
              .to(Books::Table, Books::BookId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_chapters_book")
          .table(Chapters::Table)
          .col(Chapters::BookId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Chapters::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Chapters {
  Table,
  ChapterId,
  BookId,
  Title,
  Content,
  ChapterOrder,
  IsFree,
}
