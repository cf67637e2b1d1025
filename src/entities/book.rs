//! Book entity - catalog metadata and the access level gating its chapters

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AccessLevel {
  #[sea_orm(string_value = "free")]
  Free,
  #[sea_orm(string_value = "premium")]
  Premium,
}

impl Default for AccessLevel {
  fn default() -> Self {
    Self::Free
  }
}

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
pub enum Genre {
  #[sea_orm(string_value = "fantasy")]
  Fantasy,
  #[sea_orm(string_value = "romance")]
  Romance,
  #[sea_orm(string_value = "mystery")]
  Mystery,
  #[sea_orm(string_value = "science_fiction")]
  ScienceFiction,
  #[sea_orm(string_value = "horror")]
  Horror,
  #[sea_orm(string_value = "adventure")]
  Adventure,
  #[sea_orm(string_value = "historical")]
  Historical,
  #[sea_orm(string_value = "biography")]
  Biography,
  #[sea_orm(string_value = "self_help")]
  SelfHelp,
  #[sea_orm(string_value = "educational")]
  Educational,
}

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum BookType {
  #[sea_orm(string_value = "story")]
  Story,
  #[sea_orm(string_value = "book")]
  Book,
}

#[derive(
  Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize,
  Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AgeRating {
  #[sea_orm(string_value = "all_ages")]
  AllAges,
  #[sea_orm(string_value = "teen_13")]
  Teen13Plus,
  #[sea_orm(string_value = "teen_16")]
  Teen16Plus,
  #[sea_orm(string_value = "adult_18")]
  Adult18Plus,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub book_id: i32,
  pub title: String,
  pub author: String,
  pub description: Option<String>,
  pub genre: Genre,
  pub book_type: BookType,
  pub age_rating: AgeRating,
  pub access_level: AccessLevel,
  pub cover_url: Option<String>,
  /// Monotonic detail-view counter, bumped with an atomic SQL increment.
  pub total_views: i64,
  pub created_date: NaiveDateTime,
  pub last_updated: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::chapter::Entity")]
  Chapters,
  #[sea_orm(has_many = "super::book_media::Entity")]
  Media,
  #[sea_orm(has_many = "super::review::Entity")]
  Reviews,
  #[sea_orm(has_many = "super::favorite::Entity")]
  Favorites,
  #[sea_orm(has_many = "super::reading_history::Entity")]
  ReadingHistories,
}

impl Related<super::chapter::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Chapters.def()
  }
}

impl Related<super::book_media::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Media.def()
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

impl Related<super::reading_history::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::ReadingHistories.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
