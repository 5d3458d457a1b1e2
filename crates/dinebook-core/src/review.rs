//! Reviews: immutable user ratings attached to a restaurant.
//!
//! A review starts life as a [`NewReview`] built from user input. It is then
//! stored as a [`Review`] (without a server id until the origin confirms it)
//! and, while offline, also queued as a [`PendingReview`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, restaurant::RestaurantId};

/// Maximum number of characters kept from a review's comments.
pub const MAX_COMMENT_CHARS: usize = 300;

/// Server-assigned review identity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReviewId(pub i64);

impl fmt::Display for ReviewId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A star rating between 1 and 5 inclusive.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
  pub const MAX: u8 = 5;
  pub const MIN: u8 = 1;

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<i64> for Rating {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> {
    match u8::try_from(value) {
      Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
      _ => Err(Error::InvalidRating(value)),
    }
  }
}

impl From<Rating> for i64 {
  fn from(r: Rating) -> Self { i64::from(r.0) }
}

impl fmt::Display for Rating {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Keep at most [`MAX_COMMENT_CHARS`] characters (not bytes) of `comments`.
pub fn truncate_comments(comments: &str) -> String {
  comments.chars().take(MAX_COMMENT_CHARS).collect()
}

// ─── NewReview ───────────────────────────────────────────────────────────────

/// A review as submitted by the user, before any store or server has seen it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
  pub restaurant_id: RestaurantId,
  pub name:          String,
  pub rating:        Rating,
  pub comments:      String,
  /// Client-stamped creation time.
  pub created_at:    DateTime<Utc>,
}

impl NewReview {
  /// Validate the rating, truncate the comments and stamp the creation time.
  pub fn new(
    restaurant_id: RestaurantId,
    name: impl Into<String>,
    rating: i64,
    comments: &str,
  ) -> Result<Self> {
    Ok(Self {
      restaurant_id,
      name: name.into(),
      rating: Rating::try_from(rating)?,
      comments: truncate_comments(comments),
      created_at: Utc::now(),
    })
  }
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// A review held in the confirmed-reviews partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  /// `None` for reviews created locally and not (yet) echoed by the origin.
  pub id:            Option<ReviewId>,
  pub restaurant_id: RestaurantId,
  pub name:          String,
  pub rating:        Rating,
  pub comments:      String,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    Option<DateTime<Utc>>,
}

impl Review {
  pub fn is_confirmed(&self) -> bool { self.id.is_some() }
}

impl From<NewReview> for Review {
  fn from(r: NewReview) -> Self {
    Self {
      id:            None,
      restaurant_id: r.restaurant_id,
      name:          r.name,
      rating:        r.rating,
      comments:      r.comments,
      created_at:    r.created_at,
      updated_at:    None,
    }
  }
}

// ─── PendingReview ───────────────────────────────────────────────────────────

/// Position of a review in the pending queue; assigned by the store in
/// submission order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PendingId(pub i64);

/// A review waiting for connectivity to be delivered to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
  pub queue_id: PendingId,
  pub review:   NewReview,
}
