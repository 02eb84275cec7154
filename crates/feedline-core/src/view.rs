//! Assembled read models returned to clients.
//!
//! These are computed per request from posts, users and batch reaction
//! lookups; none of them is stored.

use serde::{Deserialize, Serialize};

use crate::{
  post::{Comment, Post},
  time::Timestamp,
  user::{Role, User},
};

/// The public face of a user: never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub id:         i64,
  pub name:       String,
  pub email:      String,
  pub image_url:  Option<String>,
  pub role:       Role,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
}

impl From<&User> for UserSummary {
  fn from(user: &User) -> Self {
    Self {
      id:         user.id,
      name:       user.username.clone(),
      email:      user.email.clone(),
      image_url:  user.image_url.clone(),
      role:       user.role,
      created_at: user.created_at,
      updated_at: user.updated_at,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
  pub id:         i64,
  pub post_id:    i64,
  pub author:     UserSummary,
  pub body:       String,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
}

impl CommentView {
  pub fn new(comment: Comment, author: UserSummary) -> Self {
    Self {
      id: comment.id,
      post_id: comment.post_id,
      author,
      body: comment.body,
      created_at: comment.created_at,
      updated_at: comment.updated_at,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeReaction {
  pub count:            u64,
  pub viewer_has_liked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentReaction {
  pub count: u64,
  /// Only populated in single-post detail; always empty in lists.
  pub items: Vec<CommentView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
  pub like:    LikeReaction,
  pub comment: CommentReaction,
}

/// A post as it appears in the feed, in multi-post fetches, and in detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
  pub id:         i64,
  pub author:     UserSummary,
  pub title:      String,
  pub body:       String,
  pub image_url:  Option<String>,
  pub reactions:  Reactions,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
}

impl PostView {
  pub fn new(post: Post, author: UserSummary, reactions: Reactions) -> Self {
    Self {
      id: post.id,
      author,
      title: post.title,
      body: post.body,
      image_url: post.image_url,
      reactions,
      created_at: post.created_at,
      updated_at: post.updated_at,
    }
  }
}

/// Non-paginated list envelope, e.g. comments on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Items<T> {
  pub items: Vec<T>,
}
