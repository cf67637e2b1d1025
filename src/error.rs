//! Error types for the library server

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("user not found")]
  UserNotFound,

  #[error("book not found")]
  BookNotFound,

  #[error("chapter not found")]
  ChapterNotFound,

  #[error("transaction not found")]
  TransactionNotFound,

  #[error("review not found")]
  ReviewNotFound,

  #[error("sign in required")]
  Unauthorized,

  #[error("permission denied")]
  Forbidden,

  #[error("rating must be between 1 and 5")]
  InvalidRating,

  #[error("email already registered")]
  EmailTaken,

  #[error("book already reviewed")]
  AlreadyReviewed,

  #[error("book already in favorites")]
  AlreadyFavorited,

  #[error("{0}")]
  Validation(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
      }
      Error::UserNotFound => {
        (StatusCode::NOT_FOUND, "User not found".to_string())
      }
      Error::BookNotFound => {
        (StatusCode::NOT_FOUND, "Book not found".to_string())
      }
      Error::ChapterNotFound => {
        (StatusCode::NOT_FOUND, "Chapter not found".to_string())
      }
      Error::TransactionNotFound => {
        (StatusCode::NOT_FOUND, "Transaction not found".to_string())
      }
      Error::ReviewNotFound => {
        (StatusCode::NOT_FOUND, "Review not found".to_string())
      }
      Error::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "Sign in required".to_string())
      }
      Error::Forbidden => {
        (StatusCode::FORBIDDEN, "Permission denied".to_string())
      }
      Error::InvalidRating => {
        (StatusCode::BAD_REQUEST, "Rating must be between 1 and 5".to_string())
      }
      Error::EmailTaken => {
        (StatusCode::CONFLICT, "Email already registered".to_string())
      }
      Error::AlreadyReviewed => {
        (StatusCode::CONFLICT, "Book already reviewed".to_string())
      }
      Error::AlreadyFavorited => {
        (StatusCode::CONFLICT, "Book already in favorites".to_string())
      }
      Error::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
      Error::Internal(_) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
      }
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
