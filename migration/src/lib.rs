//! Database migrations using SeaORM

pub use sea_orm_migration::prelude::*;

mod m20260805_000001_create_users;
mod m20260805_000002_create_role_assignments;
mod m20260805_000003_create_books;
mod m20260805_000004_create_chapters;
mod m20260805_000005_create_payment_transactions;
mod m20260805_000006_create_reading_histories;
mod m20260805_000007_create_reviews;
mod m20260805_000008_create_favorites;
mod m20260805_000009_create_book_media;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260805_000001_create_users::Migration),
      Box::new(m20260805_000002_create_role_assignments::Migration),
      Box::new(m20260805_000003_create_books::Migration),
      Box::new(m20260805_000004_create_chapters::Migration),
      Box::new(m20260805_000005_create_payment_transactions::Migration),
      Box::new(m20260805_000006_create_reading_histories::Migration),
      Box::new(m20260805_000007_create_reviews::Migration),
      Box::new(m20260805_000008_create_favorites::Migration),
      Box::new(m20260805_000009_create_book_media::Migration),
    ]
  }
}
