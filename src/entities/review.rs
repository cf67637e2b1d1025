//! Review entity - rated reviews and comment-only entries
//!
//! `rating == None` marks a comment-only entry; rated rows always carry a
//! value in 1..=5. One rated row per (user, book), any number of comments.

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub review_id: i32,
  pub user_id: String,
  pub book_id: i32,
  pub rating: Option<i32>,
  pub comment: Option<String>,
  pub created_date: NaiveDateTime,
  pub updated_date: Option<NaiveDateTime>,
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
  #[sea_orm(
    belongs_to = "super::book::Entity",
    from = "Column::BookId",
    to = "super::book::Column::BookId",
    on_delete = "Cascade"
  )]
  Book,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<super::book::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Book.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
