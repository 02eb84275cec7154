//! Posts and the reactions attached to them.
//!
//! Posts and comments are soft-deleted: a non-null `deleted_at` removes the
//! row from every read path. Likes have no type of their own: a like is the
//! existence of a `(post_id, user_id)` row, and unliking removes it.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Maximum number of ids accepted by a single by-id post lookup.
pub const MAX_POSTS_BY_ID: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  /// Server-assigned and strictly increasing; doubles as the feed cursor.
  pub id:         i64,
  pub author_id:  i64,
  pub title:      String,
  pub body:       String,
  pub image_url:  Option<String>,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
  pub deleted_at: Option<Timestamp>,
}

/// Input to [`crate::store::PostStore::create_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: i64,
  pub title:     String,
  pub body:      String,
  pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:         i64,
  pub post_id:    i64,
  pub author_id:  i64,
  pub body:       String,
  pub created_at: Timestamp,
  pub updated_at: Timestamp,
  pub deleted_at: Option<Timestamp>,
}

/// Input to [`crate::store::ReactionStore::create_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:   i64,
  pub author_id: i64,
  pub body:      String,
}
