//! HTTP handlers binding the services to the JSON API
//!
//! Caller identity arrives in the `x-user-id` header, established by the
//! upstream authentication layer. Admin endpoints re-check roles through
//! the identity provider on every call.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::entities::book_media::MediaType;
use crate::entities::payment_transaction::PackageType;
use crate::entities::role_assignment::Role;
use crate::identity::IdentityProvider;
use crate::prelude::*;
use crate::state::AppState;
use crate::sv::access::ReadOutcome;
use crate::sv::catalog::{BookInput, ChapterInput, SearchQuery};
use crate::sv::review::ReviewInput;
use crate::utils;

fn caller(headers: &HeaderMap) -> Option<String> {
  headers
    .get("x-user-id")
    .and_then(|value| value.to_str().ok())
    .map(str::to_string)
}

fn require_caller(headers: &HeaderMap) -> Result<String> {
  caller(headers).ok_or(Error::Unauthorized)
}

async fn require_role(
  app: &AppState,
  headers: &HeaderMap,
  roles: &[Role],
) -> Result<String> {
  let user_id = require_caller(headers)?;
  for role in roles {
    if app.identity.is_in_role(&user_id, *role).await? {
      return Ok(user_id);
    }
  }
  Err(Error::Forbidden)
}

async fn require_staff(app: &AppState, headers: &HeaderMap) -> Result<String> {
  require_role(app, headers, &[Role::Admin, Role::SuperAdmin]).await
}

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}

// === reading ===

pub async fn read_chapter(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(chapter_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let user_id = caller(&headers);
  let outcome =
    app.sv().access.view_chapter(user_id.as_deref(), chapter_id).await?;

  Ok(Json(match outcome {
    ReadOutcome::Granted(view) => json::json!({
      "allowed": true,
      "book": view.book,
      "chapter": view.chapter,
      "prev_chapter": view.prev_chapter,
      "next_chapter": view.next_chapter,
    }),
    ReadOutcome::Denied { reason } => json::json!({
      "allowed": false,
      "reason": reason,
    }),
  }))
}

pub async fn my_history(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let rows = app.sv().history.for_user(&user_id).await?;

  let entries: Vec<_> = rows
    .into_iter()
    .map(|(entry, book)| {
      json::json!({
        "book": book,
        "chapter_id": entry.chapter_id,
        "access_time": entry.access_time,
      })
    })
    .collect();
  Ok(Json(json::json!({ "history": entries })))
}

// === catalog ===

pub async fn search_books(
  State(app): State<Arc<AppState>>,
  Query(query): Query<SearchQuery>,
) -> Result<Json<json::Value>> {
  let books = app.sv().catalog.search(query).await?;
  Ok(Json(json::json!({ "books": books })))
}

pub async fn book_detail(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let services = app.sv();
  let (book, chapters) = services.catalog.detail(book_id).await?;
  let average_rating = services.review.average_rating(book_id).await?;

  // where the caller left off, if anywhere
  let continue_reading = match caller(&headers) {
    Some(user_id) => services
      .history
      .last_chapter(&user_id, book_id)
      .await?
      .map(|chapter| chapter.chapter_id),
    None => None,
  };

  Ok(Json(json::json!({
    "book": book,
    "chapters": chapters,
    "average_rating": average_rating,
    "continue_reading": continue_reading,
  })))
}

pub async fn create_book(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(input): Json<BookInput>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let book = app.sv().catalog.create_book(input).await?;
  Ok(Json(json::json!({ "success": true, "book": book })))
}

pub async fn update_book(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(input): Json<BookInput>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let book = app.sv().catalog.update_book(book_id, input).await?;
  Ok(Json(json::json!({ "success": true, "book": book })))
}

pub async fn delete_book(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().catalog.delete_book(book_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

pub async fn add_chapter(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(input): Json<ChapterInput>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let chapter = app.sv().catalog.add_chapter(book_id, input).await?;
  Ok(Json(json::json!({ "success": true, "chapter": chapter })))
}

pub async fn update_chapter(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(chapter_id): Path<i32>,
  Json(input): Json<ChapterInput>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let chapter = app.sv().catalog.update_chapter(chapter_id, input).await?;
  Ok(Json(json::json!({ "success": true, "chapter": chapter })))
}

pub async fn delete_chapter(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(chapter_id): Path<i32>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().catalog.delete_chapter(chapter_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

pub async fn list_media(
  State(app): State<Arc<AppState>>,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let media = app.sv().catalog.media(book_id).await?;
  Ok(Json(json::json!({ "media": media })))
}

#[derive(Deserialize)]
pub struct MediaBody {
  pub url: String,
  pub media_type: MediaType,
}

pub async fn add_media(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(body): Json<MediaBody>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let media =
    app.sv().catalog.add_media(book_id, body.url, body.media_type).await?;
  Ok(Json(json::json!({ "success": true, "media": media })))
}

pub async fn delete_media(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<i32>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().catalog.delete_media(id).await?;
  Ok(Json(json::json!({ "success": true })))
}

// === accounts ===

#[derive(Deserialize)]
pub struct RegisterBody {
  pub email: String,
  pub full_name: Option<String>,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  Json(body): Json<RegisterBody>,
) -> Result<Json<json::Value>> {
  let user = app.sv().user.register(&body.email, body.full_name).await?;
  Ok(Json(json::json!({ "success": true, "user": user })))
}

#[derive(Deserialize)]
pub struct ProfileBody {
  pub full_name: Option<String>,
  pub phone_number: Option<String>,
  pub address: Option<String>,
}

pub async fn update_profile(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(body): Json<ProfileBody>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let user = app
    .sv()
    .user
    .update_profile(&user_id, body.full_name, body.phone_number, body.address)
    .await?;
  Ok(Json(json::json!({ "success": true, "user": user })))
}

// === subscriptions ===

#[derive(Deserialize)]
pub struct PurchaseBody {
  pub package: PackageType,
}

pub async fn purchase(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(body): Json<PurchaseBody>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let receipt = app.sv().subscription.purchase(&user_id, body.package).await?;

  let message = format!(
    "Payment successful! Your VIP subscription is active until {}.",
    utils::format_date(receipt.expires_at)
  );
  let warning = (!receipt.role_synced)
    .then_some("membership role could not be synced; it will be retried");

  Ok(Json(json::json!({
    "success": true,
    "message": message,
    "warning": warning,
    "transaction_id": receipt.transaction_id,
    "expires_at": receipt.expires_at,
  })))
}

pub async fn vip_status(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let state = app.sv().subscription.status(&user_id).await?;
  Ok(Json(json::json!({ "status": state })))
}

pub async fn payment_history(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let entries = app.sv().ledger.for_user(&user_id).await?;
  Ok(Json(json::json!({ "transactions": entries })))
}

pub async fn payment_receipt(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(transaction_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let entry = app.sv().ledger.find(transaction_id).await?;
  if entry.user_id != user_id {
    return Err(Error::Forbidden);
  }
  Ok(Json(json::json!({ "transaction": entry })))
}

#[derive(Deserialize)]
pub struct ExtendBody {
  pub months: u32,
}

pub async fn admin_extend_vip(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
  Json(body): Json<ExtendBody>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let expires_at =
    app.sv().subscription.admin_extend(&user_id, body.months).await?;
  Ok(Json(json::json!({ "success": true, "expires_at": expires_at })))
}

pub async fn admin_remove_vip(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().subscription.admin_remove_vip(&user_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

// === reviews & comments ===

#[derive(Deserialize)]
pub struct RateBody {
  pub rating: i32,
  pub comment: Option<String>,
}

pub async fn add_review(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(body): Json<RateBody>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let review = app
    .sv()
    .review
    .add(&user_id, book_id, ReviewInput::Rated {
      rating: body.rating,
      comment: body.comment,
    })
    .await?;

  let average = app.sv().review.average_rating(book_id).await?;
  Ok(Json(json::json!({
    "success": true,
    "review": review,
    "average_rating": average,
  })))
}

pub async fn revise_review(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(body): Json<RateBody>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let review = app
    .sv()
    .review
    .revise(&user_id, book_id, body.rating, body.comment)
    .await?;
  Ok(Json(json::json!({ "success": true, "review": review })))
}

#[derive(Deserialize)]
pub struct CommentBody {
  pub text: String,
}

pub async fn add_comment(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
  Json(body): Json<CommentBody>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let review = app
    .sv()
    .review
    .add(&user_id, book_id, ReviewInput::Comment { text: body.text })
    .await?;
  Ok(Json(json::json!({ "success": true, "review_id": review.review_id })))
}

pub async fn book_comments(
  State(app): State<Arc<AppState>>,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let comments = app.sv().review.comments(book_id).await?;
  Ok(Json(json::json!({ "comments": comments })))
}

pub async fn admin_reviews(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let rows = app.sv().review.recent().await?;

  let entries: Vec<_> = rows
    .into_iter()
    .map(|(review, book)| json::json!({ "review": review, "book": book }))
    .collect();
  Ok(Json(json::json!({ "reviews": entries })))
}

pub async fn admin_delete_review(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(review_id): Path<i32>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().review.delete(review_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

// === favorites ===

pub async fn toggle_favorite(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let is_favorited = app.sv().favorite.toggle(&user_id, book_id).await?;
  Ok(Json(json::json!({ "success": true, "is_favorited": is_favorited })))
}

#[derive(Deserialize)]
pub struct PageQuery {
  #[serde(default)]
  pub page: Option<u64>,
}

pub async fn my_favorites(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<PageQuery>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let (rows, total) = app
    .sv()
    .favorite
    .for_user(&user_id, query.page.unwrap_or(1))
    .await?;

  let entries: Vec<_> = rows
    .into_iter()
    .map(|(entry, book)| {
      json::json!({ "book": book, "date_added": entry.date_added })
    })
    .collect();
  Ok(Json(json::json!({ "favorites": entries, "total": total })))
}

pub async fn add_favorite(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  let entry = app.sv().favorite.add(&user_id, book_id).await?;
  Ok(Json(json::json!({ "success": true, "date_added": entry.date_added })))
}

pub async fn remove_favorite(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let user_id = require_caller(&headers)?;
  app.sv().favorite.remove(&user_id, book_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

pub async fn favorite_status(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(book_id): Path<i32>,
) -> Result<Json<json::Value>> {
  let Some(user_id) = caller(&headers) else {
    return Ok(Json(json::json!({ "is_favorited": false })));
  };
  let is_favorited = app.sv().favorite.contains(&user_id, book_id).await?;
  Ok(Json(json::json!({ "is_favorited": is_favorited })))
}

pub async fn favorites_count(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  let Some(user_id) = caller(&headers) else {
    return Ok(Json(json::json!({ "count": 0 })));
  };
  let count = app.sv().favorite.count(&user_id).await?;
  Ok(Json(json::json!({ "count": count })))
}

// === admin: users & analytics ===

#[derive(Deserialize)]
pub struct UserSearchQuery {
  pub search: Option<String>,
  #[serde(default)]
  pub page: Option<u64>,
}

pub async fn admin_users(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Query(query): Query<UserSearchQuery>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  let (users, total) = app
    .sv()
    .user
    .search(query.search.as_deref(), query.page.unwrap_or(1))
    .await?;
  Ok(Json(json::json!({ "users": users, "total": total })))
}

pub async fn admin_delete_user(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;
  app.sv().user.delete(&user_id).await?;
  Ok(Json(json::json!({ "success": true })))
}

pub async fn admin_analytics(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  require_staff(&app, &headers).await?;

  let services = app.sv();
  let now = Utc::now().naive_utc();
  let overview = services.analytics.overview(now).await?;
  let monthly_revenue = services.analytics.monthly_revenue(now).await?;
  let most_favorited = services.analytics.top_favorited().await?;
  let most_read = services.analytics.top_read().await?;
  let genre_affinity = services.analytics.genre_affinity().await?;

  Ok(Json(json::json!({
    "overview": overview,
    "monthly_revenue": monthly_revenue,
    "most_favorited": most_favorited,
    "most_read": most_read,
    "genre_affinity": genre_affinity,
  })))
}

pub async fn admin_conversions(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  require_role(&app, &headers, &[Role::SuperAdmin]).await?;

  let services = app.sv();
  let now = Utc::now().naive_utc();
  let daily = services.analytics.daily_conversions(now).await?;
  let hourly = services.analytics.hourly_conversions(now).await?;

  Ok(Json(json::json!({ "daily": daily, "hourly": hourly })))
}

// === admin accounts (super admin only) ===

#[derive(Deserialize)]
pub struct CreateAdminBody {
  pub email: String,
  pub full_name: Option<String>,
}

pub async fn create_admin(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Json(body): Json<CreateAdminBody>,
) -> Result<Json<json::Value>> {
  require_role(&app, &headers, &[Role::SuperAdmin]).await?;
  let admin =
    app.sv().user.create_admin(&body.email, body.full_name).await?;
  Ok(Json(json::json!({ "success": true, "admin": admin })))
}

pub async fn list_admins(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<json::Value>> {
  require_role(&app, &headers, &[Role::SuperAdmin]).await?;
  let admins = app.sv().user.admins().await?;
  Ok(Json(json::json!({ "admins": admins })))
}

pub async fn delete_admin(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(user_id): Path<String>,
) -> Result<Json<json::Value>> {
  require_role(&app, &headers, &[Role::SuperAdmin]).await?;
  app.sv().user.delete_admin(&user_id).await?;
  Ok(Json(json::json!({ "success": true })))
}
