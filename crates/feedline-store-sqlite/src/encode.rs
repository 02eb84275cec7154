//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with microsecond precision
//! and a `Z` suffix. Roles are stored as their lowercase name.

use chrono::{DateTime, SecondsFormat, Utc};
use feedline_core::{
  post::{Comment, Post},
  time::Timestamp,
  user::{Follow, Role, User},
};

use crate::{Error, Result};

// ─── Timestamp ───────────────────────────────────────────────────────────────

pub fn encode_dt(dt: Timestamp) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<Timestamp> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<Timestamp>> {
  s.map(decode_dt).transpose()
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> String { role.to_string() }

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

// ─── Id lists ────────────────────────────────────────────────────────────────

/// `?, ?, ?` for an `IN (...)` clause over `n` values.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

/// `[1,2,3]`, for binding an unbounded id set as a single `json_each` argument.
pub fn json_id_array(ids: impl IntoIterator<Item = i64>) -> String {
  let ids: Vec<String> = ids.into_iter().map(|id| id.to_string()).collect();
  format!("[{}]", ids.join(","))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, username, email, credential_hash, image_url, \
                                role, created_at, updated_at, deleted_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:              i64,
  pub username:        String,
  pub email:           String,
  pub credential_hash: String,
  pub image_url:       Option<String>,
  pub role:            String,
  pub created_at:      String,
  pub updated_at:      String,
  pub deleted_at:      Option<String>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      username:        row.get(1)?,
      email:           row.get(2)?,
      credential_hash: row.get(3)?,
      image_url:       row.get(4)?,
      role:            row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
      deleted_at:      row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:              self.id,
      username:        self.username,
      email:           self.email,
      credential_hash: self.credential_hash,
      image_url:       self.image_url,
      role:            decode_role(&self.role)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
      deleted_at:      decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

pub const POST_COLUMNS: &str =
  "id, author_id, title, body, image_url, created_at, updated_at, deleted_at";

/// Raw values read directly from a `posts` row.
pub struct RawPost {
  pub id:         i64,
  pub author_id:  i64,
  pub title:      String,
  pub body:       String,
  pub image_url:  Option<String>,
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      author_id:  row.get(1)?,
      title:      row.get(2)?,
      body:       row.get(3)?,
      image_url:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
      deleted_at: row.get(7)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:         self.id,
      author_id:  self.author_id,
      title:      self.title,
      body:       self.body,
      image_url:  self.image_url,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted_at: decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

pub const COMMENT_COLUMNS: &str =
  "id, post_id, author_id, body, created_at, updated_at, deleted_at";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:         i64,
  pub post_id:    i64,
  pub author_id:  i64,
  pub body:       String,
  pub created_at: String,
  pub updated_at: String,
  pub deleted_at: Option<String>,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      post_id:    row.get(1)?,
      author_id:  row.get(2)?,
      body:       row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
      deleted_at: row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:         self.id,
      post_id:    self.post_id,
      author_id:  self.author_id,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      deleted_at: decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

pub const FOLLOW_COLUMNS: &str = "id, follower_id, followee_id, created_at";

/// Raw values read directly from a `follows` row.
pub struct RawFollow {
  pub id:          i64,
  pub follower_id: i64,
  pub followee_id: i64,
  pub created_at:  String,
}

impl RawFollow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      follower_id: row.get(1)?,
      followee_id: row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_follow(self) -> Result<Follow> {
    Ok(Follow {
      id:          self.id,
      follower_id: self.follower_id,
      followee_id: self.followee_id,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
