//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/posts` | Body: [`CreatePostBody`]; returns 201 + item |
//! | `GET`    | `/posts` | `?ids=1,2,3` (at most 20), optional `viewer_id` |
//! | `GET`    | `/posts/{id}` | Detail with comments inlined; optional `?viewer_id` |
//! | `DELETE` | `/posts/{id}` | Soft delete; 204 |
//! | `POST`   | `/posts/{id}/comments` | Body: [`CreateCommentBody`]; 201 + comment |
//! | `GET`    | `/posts/{id}/comments` | Newest first |
//! | `DELETE` | `/posts/{id}/comments/{comment_id}` | Soft delete; 204 |
//! | `POST`   | `/posts/{id}/likes` | `?user_id=n`; 204, idempotent |
//! | `DELETE` | `/posts/{id}/likes` | `?user_id=n`; 204, idempotent |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use feedline_core::{
  Error as CoreError,
  post::{NewComment, NewPost},
  store::FeedStore,
  view::{CommentView, Items, PostView},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
  AppState,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Default, Deserialize)]
pub struct ViewerParams {
  pub viewer_id: Option<i64>,
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostBody {
  pub author_id: i64,
  #[validate(length(min = 1, max = 200))]
  pub title:     String,
  #[validate(length(min = 1, max = 5000))]
  pub body:      String,
  #[validate(length(max = 500))]
  pub image_url: Option<String>,
}

/// `POST /posts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  body.validate()?;
  let post = state
    .service
    .create_post(NewPost {
      author_id: body.author_id,
      title:     body.title,
      body:      body.body,
      image_url: body.image_url,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(post)))
}

// ─── List by ids ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Comma-separated post ids.
  pub ids:       String,
  pub viewer_id: Option<i64>,
}

/// Parse `1,2,3` into ids. Empty segments are ignored.
fn parse_ids(raw: &str) -> Result<Vec<i64>, ApiError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| {
      part
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("invalid post id: {part:?}")))
    })
    .collect()
}

/// `GET /posts?ids=<id,id,...>[&viewer_id=<id>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Items<PostView>>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let ids = parse_ids(&params.ids)?;
  let items = state.service.posts(&ids, params.viewer_id).await?;
  Ok(Json(Items { items }))
}

// ─── Get / delete one ─────────────────────────────────────────────────────────

/// `GET /posts/{id}[?viewer_id=<id>]`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<ViewerParams>,
) -> Result<Json<PostView>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  Ok(Json(state.service.post(id, params.viewer_id).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.delete_post(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Comments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
  pub author_id: i64,
  #[validate(length(min = 1, max = 1000))]
  pub body:      String,
}

/// `POST /posts/{id}/comments`
pub async fn create_comment<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<CreateCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  body.validate()?;
  let comment = state
    .service
    .create_comment(NewComment { post_id: id, author_id: body.author_id, body: body.body })
    .await?;
  Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /posts/{id}/comments`
pub async fn list_comments<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Items<CommentView>>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let items = state.service.comments(id).await?;
  Ok(Json(Items { items }))
}

/// `DELETE /posts/{id}/comments/{comment_id}`
pub async fn delete_comment<S>(
  State(state): State<AppState<S>>,
  Path((id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.delete_comment(id, comment_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Likes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LikeParams {
  pub user_id: i64,
}

/// `POST /posts/{id}/likes?user_id=<id>`
pub async fn like<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<LikeParams>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.like(id, params.user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /posts/{id}/likes?user_id=<id>`
pub async fn unlike<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<LikeParams>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.unlike(id, params.user_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod parse_tests {
  use super::parse_ids;

  #[test]
  fn ids_are_trimmed_and_empty_segments_skipped() {
    assert_eq!(parse_ids("3, 1,,2").unwrap(), vec![3, 1, 2]);
    assert!(parse_ids("").unwrap().is_empty());
  }

  #[test]
  fn non_integer_id_is_bad_request() {
    assert!(matches!(parse_ids("1,x"), Err(super::ApiError::BadRequest(_))));
  }
}
