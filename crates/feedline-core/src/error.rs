//! Error types for `feedline-core`.

use thiserror::Error;

/// The broad class of an [`Error`], used by transports to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  InvalidArgument,
  AlreadyExists,
  DataIntegrity,
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("post not found: {0}")]
  PostNotFound(i64),

  #[error("comment not found: {0}")]
  CommentNotFound(i64),

  #[error("user {follower} does not follow user {followee}")]
  FollowNotFound { follower: i64, followee: i64 },

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("cannot follow yourself")]
  SelfFollow,

  #[error("user {follower} already follows user {followee}")]
  AlreadyFollowing { follower: i64, followee: i64 },

  #[error("{0} already exists")]
  AlreadyExists(String),

  /// A row referenced another row that could not be resolved.
  #[error("data integrity violation: {0}")]
  DataIntegrity(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_)
      | Self::PostNotFound(_)
      | Self::CommentNotFound(_)
      | Self::FollowNotFound { .. } => ErrorKind::NotFound,
      Self::InvalidArgument(_) | Self::SelfFollow => ErrorKind::InvalidArgument,
      Self::AlreadyFollowing { .. } | Self::AlreadyExists(_) => {
        ErrorKind::AlreadyExists
      }
      Self::DataIntegrity(_) => ErrorKind::DataIntegrity,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }

  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidArgument(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
