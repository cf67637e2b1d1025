use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PaymentTransactions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PaymentTransactions::TransactionId)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PaymentTransactions::UserId).string().not_null())
          .col(
            ColumnDef::new(PaymentTransactions::Package).string().not_null(),
          )
          .col(
            ColumnDef::new(PaymentTransactions::Amount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(PaymentTransactions::TransactionDate)
              .date_time()
              .not_null(),
          )
          .col(
            ColumnDef::new(PaymentTransactions::Status)
              .string()
              .not_null()
              .default("Completed"),
          )
          .col(ColumnDef::new(PaymentTransactions::Notes).string().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_payment_transactions_user")
              .from(PaymentTransactions::Table, PaymentTransactions::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_payment_transactions_user")
          .table(PaymentTransactions::Table)
          .col(PaymentTransactions::UserId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_payment_transactions_date")
          .table(PaymentTransactions::Table)
          .col(PaymentTransactions::TransactionDate)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PaymentTransactions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PaymentTransactions {
  Table,
  TransactionId,
  UserId,
  Package,
  Amount,
  TransactionDate,
  Status,
  Notes,
}
