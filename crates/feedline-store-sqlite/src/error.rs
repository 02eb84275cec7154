//! Error type for `feedline-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain-level failure detected by the store (missing row, duplicate
  /// edge, oversized batch).
  #[error(transparent)]
  Core(#[from] feedline_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored column could not be decoded into its domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for feedline_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => feedline_core::Error::Storage(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
