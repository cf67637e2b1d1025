//! Role assignment entity - which users hold which role
//!
//! Role membership is a synced projection of the subscription fields on
//! the user row; entitlement decisions never read it for the `Member` role.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Copy,
  Clone,
  Debug,
  PartialEq,
  Eq,
  Hash,
  EnumIter,
  DeriveActiveEnum,
  Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
  #[sea_orm(string_value = "member")]
  Member,
  #[sea_orm(string_value = "admin")]
  Admin,
  #[sea_orm(string_value = "super_admin")]
  SuperAdmin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_assignments")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub user_id: String,
  pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id",
    on_delete = "Cascade"
  )]
  User,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
