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
          .table(Favorites::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Favorites::FavoriteId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Favorites::UserId).string().not_null())
          .col(ColumnDef::new(Favorites::BookId).integer().not_null())
          .col(ColumnDef::new(Favorites::DateAdded).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_favorites_user")
              .from(Favorites::Table, Favorites::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_favorites_book")
              .from(Favorites::Table, Favorites::BookId)
              .to(Books::Table, Books::BookId)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_favorites_user_book")
          .table(Favorites::Table)
          .col(Favorites::UserId)
          .col(Favorites::BookId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Favorites::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Favorites {
  Table,
  FavoriteId,
  UserId,
  BookId,
  DateAdded,
}
