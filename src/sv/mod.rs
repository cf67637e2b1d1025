pub mod access;
pub mod analytics;
pub mod catalog;
pub mod favorite;
pub mod history;
pub mod ledger;
pub mod review;
pub mod subscription;
pub mod user;

pub use access::Access;
pub use analytics::Analytics;
pub use catalog::Catalog;
pub use favorite::Favorite;
pub use history::History;
pub use ledger::Ledger;
pub use review::Review;
pub use subscription::Subscription;
pub use user::User;

#[cfg(test)]
pub mod testing {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
  };

  use crate::entities::book::{AccessLevel, AgeRating, BookType, Genre};
  use crate::entities::*;
  use crate::prelude::*;

  pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(user::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(role_assignment::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(book::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(chapter::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(payment_transaction::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(reading_history::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(review::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(favorite::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(book_media::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  pub async fn seed_user(
    db: &DatabaseConnection,
    id: &str,
    is_member: bool,
    subscription_expiry: Option<DateTime>,
  ) -> user::Model {
    user::ActiveModel {
      id: Set(id.to_string()),
      email: Set(format!("{id}@example.com")),
      full_name: Set(None),
      phone_number: Set(None),
      address: Set(None),
      is_member: Set(is_member),
      subscription_expiry: Set(subscription_expiry),
      reg_date: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn seed_book(
    db: &DatabaseConnection,
    title: &str,
    access_level: AccessLevel,
  ) -> book::Model {
    seed_book_in_genre(db, title, access_level, Genre::Fantasy).await
  }

  pub async fn seed_book_in_genre(
    db: &DatabaseConnection,
    title: &str,
    access_level: AccessLevel,
    genre: Genre,
  ) -> book::Model {
    let now = Utc::now().naive_utc();
    book::ActiveModel {
      book_id: NotSet,
      title: Set(title.to_string()),
      author: Set("Anonymous".to_string()),
      description: Set(None),
      genre: Set(genre),
      book_type: Set(BookType::Story),
      age_rating: Set(AgeRating::AllAges),
      access_level: Set(access_level),
      cover_url: Set(None),
      total_views: Set(0),
      created_date: Set(now),
      last_updated: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn seed_chapter(
    db: &DatabaseConnection,
    book_id: i32,
    chapter_order: i32,
    is_free: bool,
  ) -> chapter::Model {
    chapter::ActiveModel {
      chapter_id: NotSet,
      book_id: Set(book_id),
      title: Set(format!("Chapter {chapter_order}")),
      content: Set(Some("...".to_string())),
      chapter_order: Set(chapter_order),
      is_free: Set(is_free),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
