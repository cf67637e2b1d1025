//! Catalog management: books, chapters, and attached media
//!
//! Admin-side CRUD plus the public detail and search paths. The detail
//! view bumps `total_views` with a single SQL increment so concurrent
//! views never lose updates.

use serde::Deserialize;

use crate::entities::book::{self, AccessLevel, AgeRating, BookType, Genre};
use crate::entities::book_media::{self, MediaType};
use crate::entities::chapter;
use crate::prelude::*;

#[derive(Debug, Deserialize)]
pub struct BookInput {
  pub title: String,
  pub author: String,
  pub description: Option<String>,
  pub genre: Genre,
  pub book_type: BookType,
  pub age_rating: AgeRating,
  pub access_level: AccessLevel,
  pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChapterInput {
  pub title: String,
  pub content: Option<String>,
  pub chapter_order: i32,
  pub is_free: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
  pub keyword: Option<String>,
  pub genre: Option<Genre>,
  pub book_type: Option<BookType>,
  pub age_rating: Option<AgeRating>,
}

pub struct Catalog<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Catalog<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create_book(&self, input: BookInput) -> Result<book::Model> {
    if input.title.trim().is_empty() {
      return Err(Error::Validation("title must not be empty".into()));
    }

    let now = Utc::now().naive_utc();
    let book = book::ActiveModel {
      book_id: NotSet,
      title: Set(input.title),
      author: Set(input.author),
      description: Set(input.description),
      genre: Set(input.genre),
      book_type: Set(input.book_type),
      age_rating: Set(input.age_rating),
      access_level: Set(input.access_level),
      cover_url: Set(input.cover_url),
      total_views: Set(0),
      created_date: Set(now),
      last_updated: Set(now),
    }
    .insert(self.db)
    .await?;

    info!("book {} created: {}", book.book_id, book.title);
    Ok(book)
  }

  pub async fn update_book(
    &self,
    book_id: i32,
    input: BookInput,
  ) -> Result<book::Model> {
    let book = book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;

    let updated = book::ActiveModel {
      title: Set(input.title),
      author: Set(input.author),
      description: Set(input.description),
      genre: Set(input.genre),
      book_type: Set(input.book_type),
      age_rating: Set(input.age_rating),
      access_level: Set(input.access_level),
      cover_url: Set(input.cover_url),
      last_updated: Set(Utc::now().naive_utc()),
      ..book.into()
    }
    .update(self.db)
    .await?;

    Ok(updated)
  }

  /// Chapters and media go down with the book via cascade delete.
  pub async fn delete_book(&self, book_id: i32) -> Result<()> {
    let result = book::Entity::delete_by_id(book_id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::BookNotFound);
    }
    Ok(())
  }

  /// Book with its chapters in reading order; counts the detail view.
  pub async fn detail(
    &self,
    book_id: i32,
  ) -> Result<(book::Model, Vec<chapter::Model>)> {
    use sea_orm::sea_query::Expr;

    book::Entity::update_many()
      .col_expr(
        book::Column::TotalViews,
        Expr::col(book::Column::TotalViews).add(1),
      )
      .filter(book::Column::BookId.eq(book_id))
      .exec(self.db)
      .await?;

    let book = book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;
    let chapters = self.chapters(book_id).await?;

    Ok((book, chapters))
  }

  pub async fn chapters(&self, book_id: i32) -> Result<Vec<chapter::Model>> {
    let chapters = chapter::Entity::find()
      .filter(chapter::Column::BookId.eq(book_id))
      .order_by_asc(chapter::Column::ChapterOrder)
      .all(self.db)
      .await?;
    Ok(chapters)
  }

  pub async fn add_chapter(
    &self,
    book_id: i32,
    input: ChapterInput,
  ) -> Result<chapter::Model> {
    book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;

    let chapter = chapter::ActiveModel {
      chapter_id: NotSet,
      book_id: Set(book_id),
      title: Set(input.title),
      content: Set(input.content),
      chapter_order: Set(input.chapter_order),
      is_free: Set(input.is_free),
    }
    .insert(self.db)
    .await?;

    Ok(chapter)
  }

  pub async fn update_chapter(
    &self,
    chapter_id: i32,
    input: ChapterInput,
  ) -> Result<chapter::Model> {
    let chapter = chapter::Entity::find_by_id(chapter_id)
      .one(self.db)
      .await?
      .ok_or(Error::ChapterNotFound)?;

    let updated = chapter::ActiveModel {
      title: Set(input.title),
      content: Set(input.content),
      chapter_order: Set(input.chapter_order),
      is_free: Set(input.is_free),
      ..chapter.into()
    }
    .update(self.db)
    .await?;

    Ok(updated)
  }

  pub async fn delete_chapter(&self, chapter_id: i32) -> Result<()> {
    let result =
      chapter::Entity::delete_by_id(chapter_id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::ChapterNotFound);
    }
    Ok(())
  }

  /// Attribute filters narrow in SQL; the keyword matches any word against
  /// title, author, and description.
  pub async fn search(&self, query: SearchQuery) -> Result<Vec<book::Model>> {
    let mut select = book::Entity::find();
    if let Some(genre) = query.genre {
      select = select.filter(book::Column::Genre.eq(genre));
    }
    if let Some(book_type) = query.book_type {
      select = select.filter(book::Column::BookType.eq(book_type));
    }
    if let Some(age_rating) = query.age_rating {
      select = select.filter(book::Column::AgeRating.eq(age_rating));
    }

    let books = select
      .order_by_desc(book::Column::LastUpdated)
      .all(self.db)
      .await?;

    let Some(keyword) = query.keyword.filter(|k| !k.trim().is_empty()) else {
      return Ok(books);
    };

    let keyword = keyword.to_lowercase();
    let words: Vec<_> = keyword.split_whitespace().collect();

    Ok(
      books
        .into_iter()
        .filter(|book| {
          let haystack = format!(
            "{} {} {}",
            book.title,
            book.author,
            book.description.as_deref().unwrap_or_default()
          )
          .to_lowercase();
          words.iter().any(|word| haystack.contains(word))
        })
        .collect(),
    )
  }

  pub async fn media(&self, book_id: i32) -> Result<Vec<book_media::Model>> {
    let media = book_media::Entity::find()
      .filter(book_media::Column::BookId.eq(book_id))
      .order_by_desc(book_media::Column::UploadedDate)
      .all(self.db)
      .await?;
    Ok(media)
  }

  pub async fn add_media(
    &self,
    book_id: i32,
    url: String,
    media_type: MediaType,
  ) -> Result<book_media::Model> {
    book::Entity::find_by_id(book_id)
      .one(self.db)
      .await?
      .ok_or(Error::BookNotFound)?;

    if url.trim().is_empty() {
      return Err(Error::Validation("media url must not be empty".into()));
    }

    let media = book_media::ActiveModel {
      id: NotSet,
      book_id: Set(book_id),
      url: Set(url),
      media_type: Set(media_type),
      uploaded_date: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await?;

    Ok(media)
  }

  pub async fn delete_media(&self, id: i32) -> Result<()> {
    let result = book_media::Entity::delete_by_id(id).exec(self.db).await?;
    if result.rows_affected == 0 {
      return Err(Error::Validation("media not found".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::testing::*;

  fn sample_book() -> BookInput {
    BookInput {
      title: "The Silent Library".into(),
      author: "N. Archivist".into(),
      description: Some("A quiet mystery".into()),
      genre: Genre::Mystery,
      book_type: BookType::Book,
      age_rating: AgeRating::AllAges,
      access_level: AccessLevel::Premium,
      cover_url: None,
    }
  }

  #[tokio::test]
  async fn detail_increments_views_atomically_per_call() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);
    let book = catalog.create_book(sample_book()).await.unwrap();

    catalog.detail(book.book_id).await.unwrap();
    let (book, _) = catalog.detail(book.book_id).await.unwrap();

    assert_eq!(book.total_views, 2);
  }

  #[tokio::test]
  async fn chapters_come_back_in_reading_order() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);
    let book = catalog.create_book(sample_book()).await.unwrap();

    for order in [3, 1, 2] {
      catalog
        .add_chapter(book.book_id, ChapterInput {
          title: format!("Chapter {order}"),
          content: None,
          chapter_order: order,
          is_free: false,
        })
        .await
        .unwrap();
    }

    let chapters = catalog.chapters(book.book_id).await.unwrap();
    let orders: Vec<_> =
      chapters.iter().map(|chapter| chapter.chapter_order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
  }

  #[tokio::test]
  async fn deleting_a_book_cascades_to_chapters_and_media() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);
    let book = catalog.create_book(sample_book()).await.unwrap();
    catalog
      .add_chapter(book.book_id, ChapterInput {
        title: "One".into(),
        content: None,
        chapter_order: 1,
        is_free: true,
      })
      .await
      .unwrap();
    catalog
      .add_media(book.book_id, "/media/cover.jpg".into(), MediaType::Image)
      .await
      .unwrap();

    catalog.delete_book(book.book_id).await.unwrap();

    assert!(chapter::Entity::find().all(&db).await.unwrap().is_empty());
    assert!(book_media::Entity::find().all(&db).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn keyword_search_matches_any_word() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);
    catalog.create_book(sample_book()).await.unwrap();
    catalog
      .create_book(BookInput {
        title: "Dragon Tales".into(),
        author: "A. Scales".into(),
        ..sample_book()
      })
      .await
      .unwrap();

    let found = catalog
      .search(SearchQuery {
        keyword: Some("silent dragon".into()),
        ..SearchQuery::default()
      })
      .await
      .unwrap();
    assert_eq!(found.len(), 2);

    let found = catalog
      .search(SearchQuery {
        keyword: Some("archivist".into()),
        ..SearchQuery::default()
      })
      .await
      .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "The Silent Library");
  }

  #[tokio::test]
  async fn attribute_filters_narrow_the_search() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);
    catalog.create_book(sample_book()).await.unwrap();
    catalog
      .create_book(BookInput { genre: Genre::Horror, ..sample_book() })
      .await
      .unwrap();

    let found = catalog
      .search(SearchQuery {
        genre: Some(Genre::Horror),
        ..SearchQuery::default()
      })
      .await
      .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].genre, Genre::Horror);
  }

  #[tokio::test]
  async fn missing_book_is_not_found() {
    let db = setup_test_db().await;
    let catalog = Catalog::new(&db);

    assert!(matches!(
      catalog.delete_book(404).await,
      Err(Error::BookNotFound)
    ));
    assert!(matches!(
      catalog.detail(404).await,
      Err(Error::BookNotFound)
    ));
  }
}
