//! Favorites: a per-user membership set over books

use crate::entities::{book, favorite};
use crate::prelude::*;

const PAGE_SIZE: u64 = 30;

pub struct Favorite<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Favorite<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Returns whether the book is favorited after the call.
  pub async fn toggle(&self, user_id: &str, book_id: i32) -> Result<bool> {
    match self.entry(user_id, book_id).await? {
      Some(existing) => {
        favorite::Entity::delete_by_id(existing.favorite_id)
          .exec(self.db)
          .await?;
        Ok(false)
      }
      None => {
        self.insert(user_id, book_id).await?;
        Ok(true)
      }
    }
  }

  /// Strict insert; favoriting twice is a conflict.
  pub async fn add(&self, user_id: &str, book_id: i32) -> Result<favorite::Model> {
    if self.entry(user_id, book_id).await?.is_some() {
      return Err(Error::AlreadyFavorited);
    }
    self.insert(user_id, book_id).await
  }

  pub async fn remove(&self, user_id: &str, book_id: i32) -> Result<()> {
    let existing = self
      .entry(user_id, book_id)
      .await?
      .ok_or_else(|| Error::Validation("not in favorites".into()))?;
    favorite::Entity::delete_by_id(existing.favorite_id)
      .exec(self.db)
      .await?;
    Ok(())
  }

  pub async fn contains(&self, user_id: &str, book_id: i32) -> Result<bool> {
    Ok(self.entry(user_id, book_id).await?.is_some())
  }

  pub async fn count(&self, user_id: &str) -> Result<u64> {
    let count = favorite::Entity::find()
      .filter(favorite::Column::UserId.eq(user_id))
      .count(self.db)
      .await?;
    Ok(count)
  }

  /// One page of a user's favorites, newest first, with the total count.
  pub async fn for_user(
    &self,
    user_id: &str,
    page: u64,
  ) -> Result<(Vec<(favorite::Model, Option<book::Model>)>, u64)> {
    let total = self.count(user_id).await?;
    let page = page.max(1);

    let rows = favorite::Entity::find()
      .filter(favorite::Column::UserId.eq(user_id))
      .order_by_desc(favorite::Column::DateAdded)
      .offset((page - 1) * PAGE_SIZE)
      .limit(PAGE_SIZE)
      .find_also_related(book::Entity)
      .all(self.db)
      .await?;

    Ok((rows, total))
  }

  async fn entry(
    &self,
    user_id: &str,
    book_id: i32,
  ) -> Result<Option<favorite::Model>> {
    let existing = favorite::Entity::find()
      .filter(favorite::Column::UserId.eq(user_id))
      .filter(favorite::Column::BookId.eq(book_id))
      .one(self.db)
      .await?;
    Ok(existing)
  }

  async fn insert(
    &self,
    user_id: &str,
    book_id: i32,
  ) -> Result<favorite::Model> {
    book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;

    let entry = favorite::ActiveModel {
      favorite_id: NotSet,
      user_id: Set(user_id.to_string()),
      book_id: Set(book_id),
      date_added: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;
    Ok(entry)
  }
}
