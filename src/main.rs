//! Library Server - subscription-gated digital library
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the HTTP API with rate limiting
//! - Tokio for async runtime
//!
//! Free content is open to everyone; premium chapters require an active
//! VIP subscription tracked through an append-only payment ledger.

mod entities;
mod error;
mod handlers;
mod identity;
mod prelude;
mod state;
mod sv;
mod utils;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::prelude::*;
use crate::state::AppState;

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  // Initialize tracing
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "library=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url =
    env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:library.db?mode=rwc".into());

  let super_admins: Vec<String> = env::var("SUPER_ADMIN_EMAILS")
    .unwrap_or_default()
    .split(',')
    .map(str::trim)
    .filter(|email| !email.is_empty())
    .map(str::to_string)
    .collect();

  info!("Starting Library Server v{}", env!("CARGO_PKG_VERSION"));

  // Initialize application state
  let app_state = Arc::new(AppState::new(&db_url).await);

  if super_admins.is_empty() {
    warn!("No super admins configured, admin management is unreachable");
  } else if let Err(err) = app_state.seed_super_admins(&super_admins).await {
    error!("Failed to seed super admins: {err}");
  }

  // Configure rate limiting (100 requests per minute per IP)
  let governor_conf = Arc::new(
    GovernorConfigBuilder::default()
      .per_second(2)
      .burst_size(100)
      .finish()
      .expect("Failed to build rate limiter config"),
  );

  let governor_limiter = governor_conf.limiter().clone();

  // Spawn rate limiter cleanup task
  tokio::spawn(async move {
    loop {
      tokio::time::sleep(Duration::from_secs(60)).await;
      governor_limiter.retain_recent();
    }
  });

  // Build router with middleware
  let app = Router::new()
    .route("/health", get(handlers::health))
    // reading
    .route("/api/chapters/{id}", get(handlers::read_chapter))
    .route("/api/me/history", get(handlers::my_history))
    // catalog
    .route(
      "/api/books",
      get(handlers::search_books).post(handlers::create_book),
    )
    .route(
      "/api/books/{id}",
      get(handlers::book_detail)
        .put(handlers::update_book)
        .delete(handlers::delete_book),
    )
    .route("/api/books/{id}/chapters", post(handlers::add_chapter))
    .route(
      "/api/admin/chapters/{id}",
      put(handlers::update_chapter).delete(handlers::delete_chapter),
    )
    .route(
      "/api/books/{id}/media",
      get(handlers::list_media).post(handlers::add_media),
    )
    .route("/api/media/{id}", delete(handlers::delete_media))
    // accounts
    .route("/api/register", post(handlers::register))
    .route("/api/me/profile", put(handlers::update_profile))
    // subscriptions
    .route("/api/vip/purchase", post(handlers::purchase))
    .route("/api/vip/status", get(handlers::vip_status))
    .route("/api/vip/history", get(handlers::payment_history))
    .route("/api/vip/receipts/{id}", get(handlers::payment_receipt))
    // reviews & favorites
    .route(
      "/api/books/{id}/reviews",
      post(handlers::add_review).put(handlers::revise_review),
    )
    .route(
      "/api/books/{id}/comments",
      get(handlers::book_comments).post(handlers::add_comment),
    )
    .route("/api/books/{id}/favorite", post(handlers::toggle_favorite))
    .route(
      "/api/books/{id}/favorite/status",
      get(handlers::favorite_status),
    )
    .route("/api/me/favorites", get(handlers::my_favorites))
    .route(
      "/api/me/favorites/{id}",
      post(handlers::add_favorite).delete(handlers::remove_favorite),
    )
    .route("/api/me/favorites/count", get(handlers::favorites_count))
    // admin
    .route("/api/admin/users", get(handlers::admin_users))
    .route("/api/admin/users/{id}", delete(handlers::admin_delete_user))
    .route(
      "/api/admin/users/{id}/vip/extend",
      post(handlers::admin_extend_vip),
    )
    .route(
      "/api/admin/users/{id}/vip/remove",
      post(handlers::admin_remove_vip),
    )
    .route("/api/admin/reviews", get(handlers::admin_reviews))
    .route(
      "/api/admin/reviews/{id}",
      delete(handlers::admin_delete_review),
    )
    .route("/api/admin/analytics", get(handlers::admin_analytics))
    .route(
      "/api/admin/analytics/conversions",
      get(handlers::admin_conversions),
    )
    .route(
      "/api/admin/admins",
      get(handlers::list_admins).post(handlers::create_admin),
    )
    .route("/api/admin/admins/{id}", delete(handlers::delete_admin))
    // Middleware
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
    )
    .with_state(app_state);

  // Start HTTP server
  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|p| p.parse().ok())
    .unwrap_or(3000);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  info!("HTTP server listening on {}", addr);

  let listener =
    tokio::net::TcpListener::bind(addr).await.expect("Failed to bind");
  axum::serve(listener, app).await.expect("Server error");
}
