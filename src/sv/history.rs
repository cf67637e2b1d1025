//! Reading history tracker
//!
//! Keeps one "continue reading" pointer per (user, book); every recorded
//! access overwrites the previous chapter and timestamp instead of
//! appending.

use crate::entities::{book, chapter, reading_history};
use crate::prelude::*;

pub struct History<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> History<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn record_access(
    &self,
    user_id: &str,
    book_id: i32,
    chapter_id: i32,
    now: DateTime,
  ) -> Result<()> {
    let existing = reading_history::Entity::find()
      .filter(reading_history::Column::UserId.eq(user_id))
      .filter(reading_history::Column::BookId.eq(book_id))
      .one(self.db)
      .await?;

    match existing {
      Some(row) => {
        reading_history::ActiveModel {
          chapter_id: Set(chapter_id),
          access_time: Set(now),
          ..row.into()
        }
        .update(self.db)
        .await?;
      }
      None => {
        reading_history::ActiveModel {
          id: NotSet,
          user_id: Set(user_id.to_string()),
          book_id: Set(book_id),
          chapter_id: Set(chapter_id),
          access_time: Set(now),
        }
        .insert(self.db)
        .await?;
      }
    }

    Ok(())
  }

  /// A user's pointers, most recently touched book first.
  pub async fn for_user(
    &self,
    user_id: &str,
  ) -> Result<Vec<(reading_history::Model, Option<book::Model>)>> {
    let rows = reading_history::Entity::find()
      .filter(reading_history::Column::UserId.eq(user_id))
      .order_by_desc(reading_history::Column::AccessTime)
      .find_also_related(book::Entity)
      .all(self.db)
      .await?;
    Ok(rows)
  }

  pub async fn last_chapter(
    &self,
    user_id: &str,
    book_id: i32,
  ) -> Result<Option<chapter::Model>> {
    let row = reading_history::Entity::find()
      .filter(reading_history::Column::UserId.eq(user_id))
      .filter(reading_history::Column::BookId.eq(book_id))
      .one(self.db)
      .await?;

    let Some(row) = row else { return Ok(None) };
    let chapter =
      chapter::Entity::find_by_id(row.chapter_id).one(self.db).await?;
    Ok(chapter)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entities::book::AccessLevel;
  use crate::sv::testing::*;

  #[tokio::test]
  async fn second_access_overwrites_the_pointer() {
    let db = setup_test_db().await;
    let user = seed_user(&db, "reader", false, None).await;
    let book = seed_book(&db, "Serial", AccessLevel::Free).await;
    let first = seed_chapter(&db, book.book_id, 1, true).await;
    let second = seed_chapter(&db, book.book_id, 2, true).await;

    let history = History::new(&db);
    let early = (Utc::now().naive_utc() - TimeDelta::hours(1))
      .with_nanosecond(0)
      .unwrap();
    history
      .record_access(&user.id, book.book_id, first.chapter_id, early)
      .await
      .unwrap();
    let late = Utc::now().naive_utc().with_nanosecond(0).unwrap();
    history
      .record_access(&user.id, book.book_id, second.chapter_id, late)
      .await
      .unwrap();

    let rows = reading_history::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].chapter_id, second.chapter_id);
    assert_eq!(rows[0].access_time, late);
  }

  #[tokio::test]
  async fn listing_orders_by_most_recent_access() {
    let db = setup_test_db().await;
    let user = seed_user(&db, "reader", false, None).await;
    let older = seed_book(&db, "Older", AccessLevel::Free).await;
    let newer = seed_book(&db, "Newer", AccessLevel::Free).await;
    let older_chapter = seed_chapter(&db, older.book_id, 1, true).await;
    let newer_chapter = seed_chapter(&db, newer.book_id, 1, true).await;

    let history = History::new(&db);
    let now = Utc::now().naive_utc();
    history
      .record_access(
        &user.id,
        older.book_id,
        older_chapter.chapter_id,
        now - TimeDelta::days(1),
      )
      .await
      .unwrap();
    history
      .record_access(&user.id, newer.book_id, newer_chapter.chapter_id, now)
      .await
      .unwrap();

    let rows = history.for_user(&user.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0.book_id, newer.book_id);
    assert_eq!(
      rows[0].1.as_ref().map(|book| book.book_id),
      Some(newer.book_id)
    );
  }

  #[tokio::test]
  async fn last_chapter_resolves_the_pointer() {
    let db = setup_test_db().await;
    let user = seed_user(&db, "reader", false, None).await;
    let book = seed_book(&db, "Serial", AccessLevel::Free).await;
    let chapter = seed_chapter(&db, book.book_id, 3, true).await;

    let history = History::new(&db);
    let now = Utc::now().naive_utc();
    history
      .record_access(&user.id, book.book_id, chapter.chapter_id, now)
      .await
      .unwrap();

    let found = history.last_chapter(&user.id, book.book_id).await.unwrap();
    assert_eq!(found.map(|chapter| chapter.chapter_id), Some(chapter.chapter_id));

    let none = history.last_chapter(&user.id, 404).await.unwrap();
    assert!(none.is_none());
  }
}
