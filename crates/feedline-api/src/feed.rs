//! Handler for the `/feed` endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/feed` | Optional `?viewer_id`, `size`, `cursor` |

use axum::extract::State;
use feedline_core::{Error as CoreError, page::Page, store::FeedStore, view::PostView};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::{Json, Query},
  page_request,
};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  /// Omitted for anonymous viewers, who see every post.
  pub viewer_id: Option<i64>,
  pub size:      Option<u32>,
  /// Id of the last post on the previous page.
  pub cursor:    Option<i64>,
}

/// `GET /feed[?viewer_id=<id>][&size=<n>][&cursor=<post id>]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<FeedParams>,
) -> Result<Json<Page<PostView>>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let page = page_request(params.size, params.cursor, state.default_page_size)?;
  let feed = state.service.feed(params.viewer_id, page).await?;
  Ok(Json(feed))
}
