//! Reviews and the comment stream
//!
//! A rated review is one row per (user, book); comment-only entries carry
//! no rating and may pile up freely. Rating stats ignore comment-only
//! rows.

use serde::{Deserialize, Serialize};

use crate::entities::{book, review, user};
use crate::prelude::*;

const MAX_COMMENT_LEN: usize = 500;
const MAX_REVIEW_COMMENT_LEN: usize = 1000;
const COMMENT_PAGE: u64 = 5;

#[derive(Debug, Deserialize)]
pub enum ReviewInput {
  Rated { rating: i32, comment: Option<String> },
  Comment { text: String },
}

#[derive(Debug, Serialize)]
pub struct CommentView {
  pub review_id: i32,
  pub user_name: String,
  pub content: String,
  pub created_date: DateTime,
}

pub struct Review<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Review<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// First rated review or a new comment entry. A second rated review for
  /// the same (user, book) is a conflict; use [`Review::revise`] instead.
  pub async fn add(
    &self,
    user_id: &str,
    book_id: i32,
    input: ReviewInput,
  ) -> Result<review::Model> {
    book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;

    let now = Utc::now().naive_utc();
    let model = match input {
      ReviewInput::Rated { rating, comment } => {
        if !(1..=5).contains(&rating) {
          return Err(Error::InvalidRating);
        }
        if comment.as_ref().is_some_and(|c| c.len() > MAX_REVIEW_COMMENT_LEN)
        {
          return Err(Error::Validation("comment is too long".into()));
        }

        if self.rated_by(user_id, book_id).await?.is_some() {
          return Err(Error::AlreadyReviewed);
        }

        review::ActiveModel {
          review_id: NotSet,
          user_id: Set(user_id.to_string()),
          book_id: Set(book_id),
          rating: Set(Some(rating)),
          comment: Set(comment),
          created_date: Set(now),
          updated_date: Set(None),
        }
      }
      ReviewInput::Comment { text } => {
        let text = text.trim().to_string();
        if text.is_empty() || text.len() > MAX_COMMENT_LEN {
          return Err(Error::Validation("invalid comment".into()));
        }

        review::ActiveModel {
          review_id: NotSet,
          user_id: Set(user_id.to_string()),
          book_id: Set(book_id),
          rating: Set(None),
          comment: Set(Some(text)),
          created_date: Set(now),
          updated_date: Set(None),
        }
      }
    };

    Ok(model.insert(self.db).await?)
  }

  /// Update the caller's existing rated review, keeping its creation date.
  pub async fn revise(
    &self,
    user_id: &str,
    book_id: i32,
    rating: i32,
    comment: Option<String>,
  ) -> Result<review::Model> {
    if !(1..=5).contains(&rating) {
      return Err(Error::InvalidRating);
    }

    let existing = self
      .rated_by(user_id, book_id)
      .await?
      .ok_or(Error::ReviewNotFound)?;

    let updated = review::ActiveModel {
      rating: Set(Some(rating)),
      comment: Set(comment),
      updated_date: Set(Some(Utc::now().naive_utc())),
      ..existing.into()
    }
    .update(self.db)
    .await?;

    Ok(updated)
  }

  /// Average of rated entries only, rounded to one decimal.
  pub async fn average_rating(&self, book_id: i32) -> Result<Option<f64>> {
    let ratings: Vec<i32> = review::Entity::find()
      .filter(review::Column::BookId.eq(book_id))
      .filter(review::Column::Rating.is_not_null())
      .all(self.db)
      .await?
      .into_iter()
      .filter_map(|review| review.rating)
      .collect();

    if ratings.is_empty() {
      return Ok(None);
    }

    let sum: i32 = ratings.iter().sum();
    let average = sum as f64 / ratings.len() as f64;
    Ok(Some((average * 10.0).round() / 10.0))
  }

  /// Latest comments under a book with display names.
  pub async fn comments(&self, book_id: i32) -> Result<Vec<CommentView>> {
    let rows = review::Entity::find()
      .filter(review::Column::BookId.eq(book_id))
      .filter(review::Column::Comment.is_not_null())
      .filter(review::Column::Comment.ne(""))
      .order_by_desc(review::Column::CreatedDate)
      .limit(COMMENT_PAGE)
      .find_also_related(user::Entity)
      .all(self.db)
      .await?;

    Ok(
      rows
        .into_iter()
        .filter_map(|(review, user)| {
          let content = review.comment?;
          let user_name = user
            .map(|user| user.full_name.unwrap_or(user.email))
            .unwrap_or_else(|| "deleted user".to_string());
          Some(CommentView {
            review_id: review.review_id,
            user_name,
            content,
            created_date: review.created_date,
          })
        })
        .collect(),
    )
  }

  /// Moderation feed: newest entries first, with their books.
  pub async fn recent(
    &self,
  ) -> Result<Vec<(review::Model, Option<book::Model>)>> {
    let rows = review::Entity::find()
      .order_by_desc(review::Column::CreatedDate)
      .find_also_related(book::Entity)
      .all(self.db)
      .await?;
    Ok(rows)
  }

  pub async fn delete(&self, review_id: i32) -> Result<()> {
    let result = review::Entity::delete_by_id(review_id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::ReviewNotFound);
    }
    Ok(())
  }

  async fn rated_by(
    &self,
    user_id: &str,
    book_id: i32,
  ) -> Result<Option<review::Model>> {
    let existing = review::Entity::find()
      .filter(review::Column::UserId.eq(user_id))
      .filter(review::Column::BookId.eq(book_id))
      .filter(review::Column::Rating.is_not_null())
      .one(self.db)
      .await?;
    Ok(existing)
  }
}
