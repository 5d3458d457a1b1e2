//! Error types for `dinebook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
