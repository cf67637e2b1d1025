use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Books::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Books::BookId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Books::Title).string().not_null())
          .col(ColumnDef::new(Books::Author).string().not_null())
          .col(ColumnDef::new(Books::Description).string().null())
          .col(ColumnDef::new(Books::Genre).string().not_null())
          .col(ColumnDef::new(Books::BookType).string().not_null())
          .col(ColumnDef::new(Books::AgeRating).string().not_null())
          .col(
            ColumnDef::new(Books::AccessLevel)
              .string()
              .not_null()
              .default("free"),
          )
          .col(ColumnDef::new(Books::CoverUrl).string().null())
          .col(
            ColumnDef::new(Books::TotalViews)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Books::CreatedDate).date_time().not_null())
          .col(ColumnDef::new(Books::LastUpdated).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Books::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Books {
  Table,
  BookId,
  Title,
  Author,
  Description,
  Genre,
  BookType,
  AgeRating,
  AccessLevel,
  CoverUrl,
  TotalViews,
  CreatedDate,
  LastUpdated,
}
