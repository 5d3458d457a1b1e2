//! Error type for `dinebook-sync`.

use dinebook_core::restaurant::RestaurantId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
  /// The local store could not be opened. Nothing else can work.
  #[error("local store unavailable: {0}")]
  StoreUnavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("network error: {0}")]
  Network(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("restaurant {0} not found")]
  NotFound(RestaurantId),

  #[error("invalid review: {0}")]
  Invalid(#[from] dinebook_core::Error),
}

impl SyncError {
  pub(crate) fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  pub(crate) fn network<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Network(Box::new(err))
  }

  pub fn is_network(&self) -> bool { matches!(self, Self::Network(_)) }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
