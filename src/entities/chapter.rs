//! Chapter entity - owned by a book, ordered by `chapter_order`

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub chapter_id: i32,
  pub book_id: i32,
  pub title: String,
  pub content: Option<String>,
  pub chapter_order: i32,
  pub is_free: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::book::Entity",
    from = "Column::BookId",
    to = "super::book::Column::BookId",
    on_delete = "Cascade"
  )]
  Book,
}

impl Related<super::book::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Book.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
