//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: [`RegisterBody`]; returns 201 + user |
//! | `GET`    | `/users/{id}` | 404 if missing or deleted |
//! | `POST`   | `/users/{id}/follow` | Body: `{"followeeId":n}`; 204 |
//! | `DELETE` | `/users/{id}/follow` | `?followee_id=n`; 204 |
//! | `GET`    | `/users/{id}/following/{followee_id}` | `{"following":bool}` |
//! | `GET`    | `/users/{id}/followers` | Optional `?size`, `cursor` (edge id) |
//! | `GET`    | `/users/{id}/following` | Optional `?size`, `cursor` (edge id) |

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use feedline_core::{
  Error as CoreError,
  page::Page,
  store::FeedStore,
  user::{NewUser, Role},
  view::UserSummary,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
  AppState, PageParams,
  error::ApiError,
  extract::{Json, Path, Query},
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  #[validate(length(min = 1, max = 50))]
  pub username:  String,
  #[validate(email)]
  pub email:     String,
  #[validate(length(min = 8))]
  pub password:  String,
  #[validate(length(max = 500))]
  pub image_url: Option<String>,
  #[serde(default)]
  pub role:      Role,
}

/// Hash `password` into an argon2 PHC string with a fresh random salt.
fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
}

/// `POST /users`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  body.validate()?;
  let credential_hash = hash_password(&body.password)?;
  let user = state
    .service
    .register(NewUser {
      username: body.username,
      email: body.email,
      credential_hash,
      image_url: body.image_url,
      role: body.role,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<UserSummary>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  Ok(Json(state.service.user(id).await?))
}

// ─── Follow graph ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowBody {
  pub followee_id: i64,
}

/// `POST /users/{id}/follow` with body `{"followeeId":n}`
pub async fn follow<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<FollowBody>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.follow(id, body.followee_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UnfollowParams {
  pub followee_id: i64,
}

/// `DELETE /users/{id}/follow?followee_id=<id>`
pub async fn unfollow<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<UnfollowParams>,
) -> Result<StatusCode, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  state.service.unfollow(id, params.followee_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct FollowingStatus {
  pub following: bool,
}

/// `GET /users/{id}/following/{followee_id}`
pub async fn is_following<S>(
  State(state): State<AppState<S>>,
  Path((id, followee_id)): Path<(i64, i64)>,
) -> Result<Json<FollowingStatus>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let following = state.service.is_following(id, followee_id).await?;
  Ok(Json(FollowingStatus { following }))
}

/// `GET /users/{id}/followers[?size=<n>][&cursor=<edge id>]`
pub async fn followers<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<UserSummary>>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let page = params.request(state.default_page_size)?;
  Ok(Json(state.service.followers(id, page).await?))
}

/// `GET /users/{id}/following[?size=<n>][&cursor=<edge id>]`
pub async fn following<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<UserSummary>>, ApiError>
where
  S: FeedStore,
  CoreError: From<S::Error>,
{
  let page = params.request(state.default_page_size)?;
  Ok(Json(state.service.following(id, page).await?))
}
