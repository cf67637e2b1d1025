use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_users::Users;
use super::m20260805_000003_create_books::Books;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Reviews::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Reviews::ReviewId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Reviews::UserId).string().not_null())
          .col(ColumnDef::new(Reviews::BookId).integer().not_null())
          .col(ColumnDef::new(Reviews::Rating).integer().null())
          .col(ColumnDef::new(Reviews::Comment).string().null())
          .col(ColumnDef::new(Reviews::CreatedDate).date_time().not_null())
          .col(ColumnDef::new(Reviews::UpdatedDate).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_reviews_user")
              .from(Reviews::Table, Reviews::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_reviews_book")
              .from(Reviews::Table, Reviews::BookId)
              .to(Books::Table, Books::BookId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_reviews_book")
          .table(Reviews::Table)
          .col(Reviews::BookId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Reviews::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Reviews {
  Table,
  ReviewId,
  UserId,
  BookId,
  Rating,
  Comment,
  CreatedDate,
  UpdatedDate,
}
