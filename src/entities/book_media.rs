//! Book media entity - illustration and trailer links attached to a book

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum MediaType {
  #[sea_orm(string_value = "image")]
  Image,
  #[sea_orm(string_value = "video")]
  Video,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_media")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub book_id: i32,
  pub url: String,
  pub media_type: MediaType,
  pub uploaded_date: NaiveDateTime,
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
