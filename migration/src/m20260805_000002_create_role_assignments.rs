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
          .table(RoleAssignments::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(RoleAssignments::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(RoleAssignments::UserId).string().not_null())
          .col(ColumnDef::new(RoleAssignments::Role).string().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_role_assignments_user")
              .from(RoleAssignments::Table, RoleAssignments::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_role_assignments_user_role")
          .table(RoleAssignments::Table)
          .col(RoleAssignments::UserId)
          .col(RoleAssignments::Role)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(RoleAssignments::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum RoleAssignments {
  Table,
  Id,
  UserId,
  Role,
}
