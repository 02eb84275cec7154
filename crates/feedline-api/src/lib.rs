//! JSON REST API for Feedline.
//!
//! Exposes an axum [`Router`] backed by any [`FeedStore`]. Authentication is
//! the caller's responsibility: the acting user is passed explicitly
//! (`viewer_id`, `user_id`, or in the request body).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", feedline_api::api_router(store.clone(), 20))
//! ```

pub mod error;
pub mod extract;
pub mod feed;
pub mod posts;
pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use feedline_core::{
  Error as CoreError, Service,
  page::{DEFAULT_PAGE_SIZE, PageRequest},
  store::FeedStore,
};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{Level, Span};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub service:           Service<S>,
  /// Page size used when a request does not name one.
  pub default_page_size: u32,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      service:           self.service.clone(),
      default_page_size: self.default_page_size,
    }
  }
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { service: Service::new(store), default_page_size: DEFAULT_PAGE_SIZE }
  }
}

/// `?size=&cursor=` shared by every paginated listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub size:   Option<u32>,
  pub cursor: Option<i64>,
}

impl PageParams {
  fn request(&self, default_size: u32) -> Result<PageRequest, ApiError> {
    page_request(self.size, self.cursor, default_size)
  }
}

fn page_request(
  size: Option<u32>,
  cursor: Option<i64>,
  default_size: u32,
) -> Result<PageRequest, ApiError> {
  Ok(PageRequest::new(size.unwrap_or(default_size), cursor)?)
}

// ─── Request logging ──────────────────────────────────────────────────────────

/// Requests slower than this are logged at WARN instead of INFO.
pub const SLOW_REQUEST: Duration = Duration::from_millis(100);

/// The level a completed request is logged at.
pub fn response_level(latency: Duration) -> Level {
  if latency > SLOW_REQUEST { Level::WARN } else { Level::INFO }
}

fn log_response(response: &axum::response::Response, latency: Duration, _span: &Span) {
  let status = response.status().as_u16();
  let latency_ms = latency.as_millis() as u64;
  if response_level(latency) == Level::WARN {
    tracing::warn!(status, latency_ms, "slow request");
  } else {
    tracing::info!(status, latency_ms, "request completed");
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, default_page_size: u32) -> Router<()>
where
  S: FeedStore + 'static,
  CoreError: From<S::Error>,
{
  let state = AppState { default_page_size, ..AppState::new(store) };
  router(state)
}

/// Build the router from an existing [`AppState`].
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: FeedStore + 'static,
  CoreError: From<S::Error>,
{
  Router::new()
    // Feed
    .route("/feed",                               get(feed::handler::<S>))
    // Users and the follow graph
    .route("/users",                              post(users::register::<S>))
    .route("/users/{id}",                         get(users::get_one::<S>))
    .route("/users/{id}/follow",                  post(users::follow::<S>).delete(users::unfollow::<S>))
    .route("/users/{id}/following/{followee_id}", get(users::is_following::<S>))
    .route("/users/{id}/followers",               get(users::followers::<S>))
    .route("/users/{id}/following",               get(users::following::<S>))
    // Posts, comments, likes
    .route("/posts",                              get(posts::list::<S>).post(posts::create::<S>))
    .route("/posts/{id}",                         get(posts::get_one::<S>).delete(posts::delete_one::<S>))
    .route("/posts/{id}/comments",                get(posts::list_comments::<S>).post(posts::create_comment::<S>))
    .route("/posts/{id}/comments/{comment_id}",   delete(posts::delete_comment::<S>))
    .route("/posts/{id}/likes",                   post(posts::like::<S>).delete(posts::unlike::<S>))
    .layer(
      TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(log_response),
    )
    .with_state(state)
}

#[cfg(test)]
mod tests;
