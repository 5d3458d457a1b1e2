//! Error type for `dinebook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The database could not be opened or brought up to the current schema.
  #[error("store unavailable at {path}: {source}")]
  Unavailable {
    path:   String,
    #[source]
    source: tokio_rusqlite::Error,
  },

  #[error("store schema version {found} is newer than the supported {supported}")]
  FutureSchema { found: u32, supported: u32 },

  #[error("core error: {0}")]
  Core(#[from] dinebook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
