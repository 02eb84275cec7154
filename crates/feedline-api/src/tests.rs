//! Router-level tests against an in-memory SQLite store.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use feedline_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use tracing::Level;

use crate::{SLOW_REQUEST, api_router, response_level};

/// Page size 2 keeps pagination visible with few rows.
async fn app() -> Router {
  let store = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  api_router(Arc::new(store), 2)
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(value) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(value.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

async fn register(app: &Router, name: &str) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    "/users",
    Some(json!({
      "username": name,
      "email": format!("{name}@example.com"),
      "password": "correct horse",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

async fn create_post(app: &Router, author: i64, title: &str) -> i64 {
  let (status, body) = send(
    app,
    "POST",
    "/posts",
    Some(json!({ "authorId": author, "title": title, "body": "text" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_i64().unwrap()
}

fn ids(page: &Value) -> Vec<i64> {
  page["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|item| item["id"].as_i64().unwrap())
    .collect()
}

// ── Users ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_fetch_user() {
  let app = app().await;
  let id = register(&app, "ada").await;

  let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "ada");
  assert_eq!(body["role"], "user");
  let created_at = body["createdAt"].as_str().expect("createdAt string");
  assert!(created_at.ends_with('Z'), "{created_at}");
  assert!(body.get("credentialHash").is_none());
  assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
  let app = app().await;
  register(&app, "ada").await;

  let (status, _) = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "username": "ada", "email": "x@example.com", "password": "12345678" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) = send(
    &app,
    "POST",
    "/users",
    Some(json!({ "username": "bob", "email": "not-an-email", "password": "12345678" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_user_is_404() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/users/99", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("99"));
}

// ── Follow graph ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_lifecycle() {
  let app = app().await;
  let a = register(&app, "a").await;
  let b = register(&app, "b").await;

  let follow = |followee: i64| json!({ "followeeId": followee });

  let (status, _) = send(&app, "POST", &format!("/users/{a}/follow"), Some(follow(a))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, "POST", &format!("/users/{a}/follow"), Some(follow(b))).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "POST", &format!("/users/{a}/follow"), Some(follow(b))).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, body) = send(&app, "GET", &format!("/users/{a}/following/{b}"), None).await;
  assert_eq!(body, json!({ "following": true }));

  let (status, body) = send(&app, "GET", &format!("/users/{b}/followers"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&body), vec![a]);
  assert_eq!(body["hasNext"], false);

  let uri = format!("/users/{a}/follow?followee_id={b}");
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Feed ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_pages_with_cursor() {
  let app = app().await;
  let viewer = register(&app, "viewer").await;
  let author = register(&app, "author").await;
  send(
    &app,
    "POST",
    &format!("/users/{viewer}/follow"),
    Some(json!({ "followeeId": author })),
  )
  .await;
  let p1 = create_post(&app, author, "one").await;
  let p2 = create_post(&app, author, "two").await;
  let p3 = create_post(&app, author, "three").await;

  let (status, page) = send(&app, "GET", &format!("/feed?viewer_id={viewer}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&page), vec![p3, p2]);
  assert_eq!(page["hasNext"], true);
  assert_eq!(page["nextCursor"], p2);
  assert_eq!(page["items"][0]["author"]["name"], "author");
  assert_eq!(page["items"][0]["reactions"]["like"]["viewerHasLiked"], false);
  assert_eq!(page["items"][0]["reactions"]["comment"]["items"], json!([]));
  let created_at = page["items"][0]["createdAt"].as_str().expect("createdAt string");
  assert!(created_at.ends_with('Z'), "{created_at}");
  let author_created = page["items"][0]["author"]["createdAt"].as_str().expect("author createdAt");
  assert!(author_created.ends_with('Z'), "{author_created}");

  let uri = format!("/feed?viewer_id={viewer}&cursor={p2}");
  let (_, page) = send(&app, "GET", &uri, None).await;
  assert_eq!(ids(&page), vec![p1]);
  assert_eq!(page["hasNext"], false);
  assert_eq!(page["nextCursor"], Value::Null);
}

#[tokio::test]
async fn anonymous_feed_sees_everything() {
  let app = app().await;
  let a = register(&app, "a").await;
  let b = register(&app, "b").await;
  let p1 = create_post(&app, a, "one").await;
  let p2 = create_post(&app, b, "two").await;

  let (_, page) = send(&app, "GET", "/feed?size=10", None).await;
  assert_eq!(ids(&page), vec![p2, p1]);
}

#[tokio::test]
async fn feed_rejects_bad_page_parameters() {
  let app = app().await;
  let (status, _) = send(&app, "GET", "/feed?size=0", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&app, "GET", "/feed?size=101", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, body) = send(&app, "GET", "/feed?cursor=abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn extractor_rejections_use_the_error_body() {
  let app = app().await;

  let (status, body) = send(&app, "GET", "/users/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let request = Request::builder()
    .method("POST")
    .uri("/users")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let resp = app.clone().oneshot(request).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).expect("json error body");
  assert!(body["error"].is_string(), "{body}");

  let (status, body) = send(&app, "POST", "/users", Some(json!({ "name": 7 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string(), "{body}");
}

#[test]
fn slow_requests_log_at_warn() {
  assert_eq!(response_level(Duration::from_millis(250)), Level::WARN);
  assert_eq!(response_level(SLOW_REQUEST + Duration::from_millis(1)), Level::WARN);
  assert_eq!(response_level(SLOW_REQUEST), Level::INFO);
  assert_eq!(response_level(Duration::from_millis(5)), Level::INFO);
}

// ── Posts ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn post_detail_inlines_comments_and_likes() {
  let app = app().await;
  let author = register(&app, "author").await;
  let fan = register(&app, "fan").await;
  let post = create_post(&app, author, "hello").await;

  for _ in 0..2 {
    let uri = format!("/posts/{post}/likes?user_id={fan}");
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }
  for text in ["first", "second"] {
    let (status, _) = send(
      &app,
      "POST",
      &format!("/posts/{post}/comments"),
      Some(json!({ "authorId": fan, "body": text })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, body) = send(&app, "GET", &format!("/posts/{post}?viewer_id={fan}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["reactions"]["like"], json!({ "count": 1, "viewerHasLiked": true }));
  assert_eq!(body["reactions"]["comment"]["count"], 2);
  assert_eq!(body["reactions"]["comment"]["items"][0]["body"], "second");
  assert_eq!(body["reactions"]["comment"]["items"][1]["author"]["name"], "fan");

  let (_, listed) = send(&app, "GET", &format!("/posts/{post}/comments"), None).await;
  assert_eq!(listed["items"].as_array().unwrap().len(), 2);

  let uri = format!("/posts/{post}/likes?user_id={fan}");
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn posts_by_ids_keep_order_and_enforce_limit() {
  let app = app().await;
  let a = register(&app, "a").await;
  let p1 = create_post(&app, a, "one").await;
  let p2 = create_post(&app, a, "two").await;

  let (status, body) = send(&app, "GET", &format!("/posts?ids={p2},999,{p1}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(ids(&body), vec![p2, p1]);

  let many = (1..=21).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
  let (status, _) = send(&app, "GET", &format!("/posts?ids={many}"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, "GET", "/posts?ids=1,x", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_post_disappears() {
  let app = app().await;
  let a = register(&app, "a").await;
  let post = create_post(&app, a, "gone").await;

  let (status, _) = send(&app, "DELETE", &format!("/posts/{post}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&app, "GET", &format!("/posts/{post}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "DELETE", &format!("/posts/{post}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) =
    send(&app, "POST", &format!("/posts/{post}/likes?user_id={a}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, page) = send(&app, "GET", "/feed", None).await;
  assert!(ids(&page).is_empty());
}

#[tokio::test]
async fn create_post_validates_lengths() {
  let app = app().await;
  let a = register(&app, "a").await;
  let (status, _) = send(
    &app,
    "POST",
    "/posts",
    Some(json!({ "authorId": a, "title": "", "body": "text" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    "POST",
    "/posts",
    Some(json!({ "authorId": 404, "title": "t", "body": "text" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_comment_on_wrong_post_is_404() {
  let app = app().await;
  let a = register(&app, "a").await;
  let p1 = create_post(&app, a, "one").await;
  let p2 = create_post(&app, a, "two").await;
  let (_, comment) = send(
    &app,
    "POST",
    &format!("/posts/{p1}/comments"),
    Some(json!({ "authorId": a, "body": "hi" })),
  )
  .await;
  let comment_id = comment["id"].as_i64().unwrap();

  let (status, _) =
    send(&app, "DELETE", &format!("/posts/{p2}/comments/{comment_id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) =
    send(&app, "DELETE", &format!("/posts/{p1}/comments/{comment_id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}
