//! Payment transaction entity - the append-only subscription ledger
//!
//! Rows are created by the subscription service and never mutated or
//! deleted afterwards. Only `status == "Completed"` entries count toward
//! revenue and VIP metrics.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Status value of entries that count toward revenue and VIP metrics.
pub const COMPLETED: &str = "Completed";

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
pub enum PackageType {
  #[sea_orm(string_value = "one_month")]
  OneMonth,
  #[sea_orm(string_value = "three_months")]
  ThreeMonths,
  #[sea_orm(string_value = "six_months")]
  SixMonths,
  #[sea_orm(string_value = "one_year")]
  OneYear,
  #[sea_orm(string_value = "lifetime")]
  Lifetime,
}

impl PackageType {
  /// Fixed price in whole currency units.
  pub fn price(self) -> i64 {
    match self {
      Self::OneMonth => 50_000,
      Self::ThreeMonths => 130_000,
      Self::SixMonths => 250_000,
      Self::OneYear => 450_000,
      Self::Lifetime => 1_200_000,
    }
  }

  /// Subscription duration in months; `None` for lifetime.
  pub fn months(self) -> Option<u32> {
    match self {
      Self::OneMonth => Some(1),
      Self::ThreeMonths => Some(3),
      Self::SixMonths => Some(6),
      Self::OneYear => Some(12),
      Self::Lifetime => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::OneMonth => "1 Month",
      Self::ThreeMonths => "3 Months",
      Self::SixMonths => "6 Months",
      Self::OneYear => "1 Year",
      Self::Lifetime => "Lifetime",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_transactions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub transaction_id: i32,
  pub user_id: String,
  pub package: PackageType,
  /// Whole currency units; exact integer arithmetic, no float drift.
  pub amount: i64,
  pub transaction_date: NaiveDateTime,
  pub status: String,
  pub notes: Option<String>,
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
