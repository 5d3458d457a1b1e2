//! Error type for `dinebook-remote`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  /// Connection, timeout or body transfer failure.
  #[error("{endpoint} failed: {source}")]
  Request {
    endpoint: &'static str,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{endpoint} → {status}")]
  Status {
    endpoint: &'static str,
    status:   StatusCode,
  },

  /// The origin answered, but not with the JSON we expected.
  #[error("{endpoint} returned a malformed body: {source}")]
  Decode {
    endpoint: &'static str,
    #[source]
    source:   dinebook_core::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
