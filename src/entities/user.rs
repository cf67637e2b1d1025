//! User entity - account fields driving entitlement decisions
//!
//! `is_member` together with `subscription_expiry` is the source of truth
//! for VIP access; role assignments are a synced projection of it.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub email: String,
  pub full_name: Option<String>,
  pub phone_number: Option<String>,
  pub address: Option<String>,
  pub is_member: bool,
  /// `None` while `is_member` is set means the subscription never expires.
  pub subscription_expiry: Option<NaiveDateTime>,
  pub reg_date: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::role_assignment::Entity")]
  RoleAssignments,
  #[sea_orm(has_many = "super::payment_transaction::Entity")]
  PaymentTransactions,
  #[sea_orm(has_many = "super::reading_history::Entity")]
  ReadingHistories,
  #[sea_orm(has_many = "super::review::Entity")]
  Reviews,
  #[sea_orm(has_many = "super::favorite::Entity")]
  Favorites,
}

impl Related<super::role_assignment::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::RoleAssignments.def()
  }
}

impl Related<super::payment_transaction::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PaymentTransactions.def()
  }
}

impl Related<super::reading_history::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::ReadingHistories.def()
  }
}

impl Related<super::review::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Reviews.def()
  }
}

impl Related<super::favorite::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Favorites.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
