//! Users and the follow graph between them.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// What a user is allowed to do. Stored as its lowercase name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

/// A registered account.
#[derive(Debug, Clone)]
pub struct User {
  pub id:              i64,
  /// Unique across all users.
  pub username:        String,
  /// Unique across all users.
  pub email:           String,
  /// Argon2 PHC string; never leaves the process.
  pub credential_hash: String,
  pub image_url:       Option<String>,
  pub role:            Role,
  pub created_at:      Timestamp,
  pub updated_at:      Timestamp,
  pub deleted_at:      Option<Timestamp>,
}

impl User {
  pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

/// Input to [`crate::store::UserStore::create_user`]. The password must
/// already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:        String,
  pub email:           String,
  pub credential_hash: String,
  pub image_url:       Option<String>,
  pub role:            Role,
}

/// A directed edge: `follower_id` follows `followee_id`.
///
/// At most one edge exists per ordered pair and an edge never loops back to
/// its own follower. Unfollowing deletes the edge outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
  pub id:          i64,
  pub follower_id: i64,
  pub followee_id: i64,
  pub created_at:  Timestamp,
}
